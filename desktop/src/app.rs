use std::time::Duration;

use eframe::egui;
use log::{error, warn};
use math_champion::game::level_name;
use math_champion::mastery::MasteryBand;
use math_champion::random::{Clock, RandRandom, StdRandom, SystemClock};
use math_champion::session::Progress;
use math_champion::{
    Config, FeedbackKind, Intent, JsonFileStorage, RenderCommand, SessionOrchestrator,
    SessionResults, UiPort,
};

const LEVELS: [u32; 3] = [5, 10, 12];

const GREEN: egui::Color32 = egui::Color32::from_rgb(50, 205, 50);
const RED: egui::Color32 = egui::Color32::from_rgb(220, 20, 60);
const AMBER: egui::Color32 = egui::Color32::from_rgb(230, 170, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Start,
    Game,
    Results,
    Progress,
}

/// What is on screen, driven by render commands.
#[derive(Debug, Default)]
pub struct ViewState {
    screen: Screen,
    question: Option<(u32, u32)>,
    choices: Vec<u32>,
    feedback: Option<(String, FeedbackKind)>,
    reveal: Option<(u32, u32)>,
    score: u32,
    streak: u32,
    results: Option<SessionResults>,
}

impl UiPort for ViewState {
    fn render(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowQuestion { num1, num2 } => {
                self.screen = Screen::Game;
                self.question = Some((num1, num2));
                self.feedback = None;
                self.reveal = None;
            }
            RenderCommand::ShowChoices(choices) => self.choices = choices,
            RenderCommand::ShowFeedback { text, kind } => self.feedback = Some((text, kind)),
            RenderCommand::RevealAnswer { chosen, correct } => {
                self.reveal = Some((chosen, correct))
            }
            RenderCommand::ShowScore { score, streak } => {
                self.score = score;
                self.streak = streak;
            }
            RenderCommand::ShowResults(results) => {
                self.screen = Screen::Results;
                self.results = Some(results);
            }
        }
    }
}

type Orchestrator = SessionOrchestrator<JsonFileStorage, ViewState, StdRandom>;

pub struct MathChampionApp {
    session: Orchestrator,
    progress_level: u32,
    progress: ProgressCache,
    confirm_reset: bool,
}

/// Progress for one level, loaded once and kept until invalidated.
#[derive(Debug, Default)]
struct ProgressCache {
    level: u32,
    progress: Option<Progress>,
}

impl ProgressCache {
    fn invalidate(&mut self) {
        self.progress = None;
    }

    fn get_or_load(&mut self, level: u32, load: impl FnOnce(u32) -> Progress) -> &Progress {
        if self.level != level {
            self.level = level;
            self.progress = None;
        }
        self.progress.get_or_insert_with(|| load(level))
    }
}

impl MathChampionApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, profile: String, config: Config) -> Self {
        let storage = JsonFileStorage::default_location().unwrap_or_else(|e| {
            let fallback = std::env::temp_dir().join("math_champion");
            warn!("{e}; saving to {}", fallback.display());
            JsonFileStorage::new(fallback)
        });
        let session = SessionOrchestrator::new(
            profile,
            storage,
            ViewState::default(),
            RandRandom::from_entropy(),
            SystemClock,
        )
        .with_config(config);

        Self {
            session,
            progress_level: 12,
            progress: ProgressCache::default(),
            confirm_reset: false,
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        if let Err(e) = self.session.handle(intent) {
            error!("{intent:?} failed: {e}");
        }
    }

    fn show_start(&mut self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        ui.label(format!("Hi, {}!", self.session.user_id()));
        ui.add_space(20.0);
        for level in LEVELS {
            let label = format!("{} (up to {level} × {level})", level_name(level));
            if ui
                .add_sized([240.0, 40.0], egui::Button::new(label))
                .clicked()
            {
                intents.push(Intent::Start { max_number: level });
            }
            ui.add_space(8.0);
        }
        ui.add_space(12.0);
        if ui.small_button("My progress").clicked() {
            self.progress.invalidate();
            self.session.ui_mut().screen = Screen::Progress;
        }
    }

    fn show_game(&self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let view = self.session.ui();
        ui.horizontal(|ui| {
            ui.label(format!("Score: {}", view.score));
            ui.separator();
            ui.label(format!("Streak: {}", view.streak));
        });
        ui.add_space(20.0);

        if let Some((num1, num2)) = view.question {
            let answer = match view.reveal {
                Some((_, correct)) => correct.to_string(),
                None => "?".to_string(),
            };
            ui.label(
                egui::RichText::new(format!("{num1} × {num2} = {answer}"))
                    .size(44.0)
                    .strong(),
            );
        }
        ui.add_space(20.0);

        egui::Grid::new("choices").spacing([12.0, 12.0]).show(ui, |ui| {
            for (i, choice) in view.choices.iter().enumerate() {
                let label = egui::RichText::new(choice.to_string()).size(26.0);
                let mut button = egui::Button::new(label);
                if let Some((chosen, correct)) = view.reveal {
                    if *choice == correct {
                        button = button.fill(GREEN);
                    } else if *choice == chosen {
                        button = button.fill(RED);
                    }
                }
                let enabled = view.reveal.is_none();
                if ui
                    .add_enabled(enabled, button.min_size(egui::vec2(120.0, 56.0)))
                    .clicked()
                {
                    intents.push(Intent::AnswerSelected(*choice));
                }
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });
        ui.add_space(16.0);

        if let Some((text, kind)) = &view.feedback {
            let color = match kind {
                FeedbackKind::Correct => GREEN,
                FeedbackKind::Wrong => RED,
                FeedbackKind::Neutral => AMBER,
            };
            ui.label(egui::RichText::new(text).size(20.0).color(color));
        }

        ui.add_space(20.0);
        if ui.button("Quit").clicked() {
            intents.push(Intent::EndSession);
        }
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        if let Some(results) = &self.session.ui().results {
            ui.heading(&results.title);
            ui.add_space(12.0);
            egui::Grid::new("results").num_columns(2).show(ui, |ui| {
                ui.label("Level");
                ui.label(&results.level_name);
                ui.end_row();
                ui.label("Questions");
                ui.label(format!("{} / {}", results.correct, results.total));
                ui.end_row();
                ui.label("Accuracy");
                ui.label(format!("{}%", results.accuracy));
                ui.end_row();
                ui.label("Score");
                ui.label(egui::RichText::new(results.score.to_string()).strong());
                ui.end_row();
            });
        }
        ui.add_space(20.0);
        if ui.button("Menu").clicked() {
            self.session.ui_mut().screen = Screen::Start;
        }
    }

    fn show_progress(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for level in LEVELS {
                ui.selectable_value(&mut self.progress_level, level, level_name(level));
            }
        });

        {
            let session = &self.session;
            let progress = self
                .progress
                .get_or_load(self.progress_level, |level| session.progress(level));
            ui.label(format!("Mastered: {}/{}", progress.mastered, progress.fact_count));
            ui.add_space(8.0);

            egui::Grid::new("tables").num_columns(4).show(ui, |ui| {
                for table in 2..=self.progress_level {
                    let text = match progress.tables.get(&table) {
                        Some(pct) => {
                            let color = match MasteryBand::from_percent(*pct) {
                                MasteryBand::Mastered => GREEN,
                                MasteryBand::Learning => AMBER,
                                MasteryBand::Struggling => RED,
                            };
                            egui::RichText::new(format!("{table}s {pct}%")).color(color)
                        }
                        None => egui::RichText::new(format!("{table}s -")),
                    };
                    ui.label(text);
                    if (table - 1) % 4 == 0 {
                        ui.end_row();
                    }
                }
            });
            ui.add_space(12.0);

            if progress.history.is_empty() {
                ui.label("No quizzes yet. Start playing!");
            }
            egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                for entry in &progress.history {
                    ui.label(format!(
                        "{}  {}  {} pts  {}/{} ({}%)",
                        entry.date.format("%Y-%m-%d"),
                        level_name(entry.level),
                        entry.score,
                        entry.correct,
                        entry.total,
                        entry.accuracy()
                    ));
                }
            });
        }
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui.button("Back").clicked() {
                self.session.ui_mut().screen = Screen::Start;
            }
            if self.confirm_reset {
                ui.label("Reset all progress?");
                if ui.button("Yes, reset").clicked() {
                    self.session.reset_mastery();
                    self.progress.invalidate();
                    self.confirm_reset = false;
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_reset = false;
                }
            } else if ui.small_button("Reset progress").clicked() {
                self.confirm_reset = true;
            }
        });
    }
}

impl eframe::App for MathChampionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatch(Intent::Tick);
        if let Some(due) = self.session.next_question_due() {
            let wait = (due - SystemClock.now_ms()).max(0) as u64;
            ctx.request_repaint_after(Duration::from_millis(wait));
        }

        let mut intents = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(16.0);
                ui.heading("Math Champion");
                ui.add_space(16.0);

                match self.session.ui().screen {
                    Screen::Start => self.show_start(ui, &mut intents),
                    Screen::Game => self.show_game(ui, &mut intents),
                    Screen::Results => self.show_results(ui),
                    Screen::Progress => self.show_progress(ui),
                }
            });
        });

        for intent in intents {
            self.dispatch(intent);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.dispatch(Intent::EndSession);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn progress(mastered: usize) -> Progress {
        Progress {
            tables: BTreeMap::new(),
            mastered,
            fact_count: 15,
            history: Vec::new(),
        }
    }

    #[test]
    fn progress_is_loaded_once_per_level() {
        let loads = Cell::new(0);
        let load = |level: u32| {
            loads.set(loads.get() + 1);
            progress(level as usize)
        };
        let mut cache = ProgressCache::default();

        for _ in 0..3 {
            assert_eq!(cache.get_or_load(5, load).mastered, 5);
        }
        assert_eq!(loads.get(), 1);

        assert_eq!(cache.get_or_load(10, load).mastered, 10);
        assert_eq!(loads.get(), 2);

        cache.invalidate();
        cache.get_or_load(10, load);
        assert_eq!(loads.get(), 3);
    }
}
