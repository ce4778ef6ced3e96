use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{ScoreError, TicketError};

/// Any domain validation failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Ticket(#[from] TicketError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleId, Score};

    #[test]
    fn domain_errors_convert_and_keep_message() {
        let err: Error = Score::new(120).unwrap_err().into();
        assert!(matches!(err, Error::Score(_)));

        let err: Error = CatalogError::UnknownModule(ModuleId::new("ghost")).into();
        assert_eq!(err.to_string(), CatalogError::UnknownModule(ModuleId::new("ghost")).to_string());
    }
}
