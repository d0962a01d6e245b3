use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error(
        "degenerate correspondence: pupil separation {separation:.2}px is below the {minimum:.2}px minimum"
    )]
    DegenerateCorrespondence { separation: f32, minimum: f32 },

    #[error("transform is not finite (scale {scale})")]
    NonFiniteTransform { scale: f32 },
}

pub type Result<T> = std::result::Result<T, AlignmentError>;
