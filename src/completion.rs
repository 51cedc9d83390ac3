//! # Terminal outcomes

/// Terminal outcome of a non-throwing channel or subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// The sequence ended cleanly
    Finished,
}

/// Terminal outcome of a throwing channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailableCompletion<E> {
    /// The sequence ended cleanly
    Finished,
    /// The sequence ended with an error
    Failure(E),
}

impl<E> FailableCompletion<E> {
    /// Returns `true` for [Finished](FailableCompletion::Finished)
    pub fn is_finished(&self) -> bool {
        matches!(self, FailableCompletion::Finished)
    }

    /// Returns `true` for [Failure](FailableCompletion::Failure)
    pub fn is_failed(&self) -> bool {
        matches!(self, FailableCompletion::Failure(_))
    }

    /// Returns the carried error, if any
    pub fn failure(self) -> Option<E> {
        match self {
            FailableCompletion::Finished => None,
            FailableCompletion::Failure(error) => Some(error),
        }
    }
}

impl<E> From<Completion> for FailableCompletion<E> {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Finished => FailableCompletion::Finished,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags() {
        let finished = FailableCompletion::<&str>::from(Completion::Finished);
        assert!(finished.is_finished());
        assert!(!finished.is_failed());
        assert_eq!(finished.failure(), None);

        let failed = FailableCompletion::Failure("boom");
        assert!(failed.is_failed());
        assert_eq!(failed.failure(), Some("boom"));
    }
}
