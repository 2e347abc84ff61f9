//! Rendering engine errors as miette diagnostics.

use miette::{Diagnostic, Severity};
use rshell_diagnostics::{ErrorCategory, ErrorRecord, Reportable};
use std::fmt;

#[derive(Debug)]
pub struct RecordDiagnostic {
    record: ErrorRecord,
}

impl RecordDiagnostic {
    pub fn from_error(error: &dyn Reportable) -> Self {
        Self {
            record: error.to_record(),
        }
    }
}

impl fmt::Display for RecordDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record.message_text)
    }
}

impl std::error::Error for RecordDiagnostic {}

impl Diagnostic for RecordDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.record.fully_qualified_id()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.record.category {
            ErrorCategory::MetadataError => "the command definition is broken; fix its parameters or aliases",
            ErrorCategory::InvalidArgument => "check the spelling, or type more of the parameter name",
            ErrorCategory::ObjectNotFound => "make sure the command file defining it is loaded",
            ErrorCategory::ReadError => "check the path and the JSON syntax",
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// Print an error to stderr.
pub fn print_error(error: &dyn Reportable) {
    let report = miette::Report::new(RecordDiagnostic::from_error(error));
    eprintln!("{:?}", report);
}
