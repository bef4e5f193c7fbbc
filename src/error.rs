use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("max number {value} is outside the supported range {min}..={max}")]
    InvalidMaxNumber { value: u32, min: u32, max: u32 },

    #[error("{answer_count} choices do not fit in the {max_product} products of max number {max_number}")]
    TooManyChoices {
        answer_count: usize,
        max_number: u32,
        max_product: u32,
    },

    #[error("could not find enough distractors for {answer} (max number {max_number}) after {attempts} draws")]
    DistractorSpaceExhausted {
        answer: u32,
        max_number: u32,
        attempts: u32,
    },
}

pub type Result<T> = std::result::Result<T, GameError>;
