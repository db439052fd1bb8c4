//! Progress notifications emitted while importing

use std::path::PathBuf;

/// Something that happened during an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// Every activity file under the root is already in the database
    NothingToImport,
    /// A file was decoded; `index` is 1-based, `total` counts files left after dedup
    Parsed {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// A decoded activity was written to the database
    Saved {
        index: usize,
        total: usize,
        filename: String,
    },
}

/// Receiver of import events
pub trait ImportProgress {
    fn on_event(&mut self, event: &ImportEvent);
}

impl<T: ImportProgress + ?Sized> ImportProgress for &mut T {
    fn on_event(&mut self, event: &ImportEvent) {
        (**self).on_event(event);
    }
}

/// Collects events in memory
impl ImportProgress for Vec<ImportEvent> {
    fn on_event(&mut self, event: &ImportEvent) {
        self.push(event.clone());
    }
}

/// Prints one line per saved activity to stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    /// Line printed for an event, if any
    pub fn line(event: &ImportEvent) -> Option<String> {
        match event {
            ImportEvent::NothingToImport => Some("No unparsed file found.".to_string()),
            ImportEvent::Parsed { .. } => None,
            ImportEvent::Saved { index, total, .. } => Some(format!("Saved {}/{}.", index, total)),
        }
    }
}

impl ImportProgress for ConsoleProgress {
    fn on_event(&mut self, event: &ImportEvent) {
        if let ImportEvent::Parsed { index, total, path } = event {
            tracing::debug!(path = %path.display(), "Parsed {}/{}", index, total);
        }
        if let Some(line) = Self::line(event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_lines() {
        assert_eq!(
            ConsoleProgress::line(&ImportEvent::NothingToImport).as_deref(),
            Some("No unparsed file found.")
        );
        assert_eq!(
            ConsoleProgress::line(&ImportEvent::Saved {
                index: 1,
                total: 3,
                filename: "a.fit".to_string(),
            })
            .as_deref(),
            Some("Saved 1/3.")
        );
        assert_eq!(
            ConsoleProgress::line(&ImportEvent::Parsed {
                index: 1,
                total: 3,
                path: PathBuf::from("a.fit"),
            }),
            None
        );
    }

    #[test]
    fn test_vec_collects_events() {
        let mut events: Vec<ImportEvent> = Vec::new();
        events.on_event(&ImportEvent::NothingToImport);
        assert_eq!(events, vec![ImportEvent::NothingToImport]);
    }
}
