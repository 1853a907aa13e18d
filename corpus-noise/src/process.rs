/// Process mode a pipeline runs in
///
/// Operators use it to decide whether they apply at all: data augmentation and
/// noise only make sense when preparing training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessType {
    #[default]
    Training,
    /// Translation (inference) of new text
    Inference,
}

impl ProcessType {
    pub fn is_training(&self) -> bool {
        matches!(self, ProcessType::Training)
    }
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessType::Training => write!(f, "training"),
            ProcessType::Inference => write!(f, "inference"),
        }
    }
}
