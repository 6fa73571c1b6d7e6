//! Watch mode: rebuilds the whole site whenever a watched source changes.

use crate::config::Config;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::sync::mpsc::Receiver;

/// Whether `event` changes content a build reads.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Discards every event already queued, returning how many there were.
fn drain<T>(rx: &Receiver<T>) -> usize {
    rx.try_iter().count()
}

/// Blocks forever, calling `rebuild` after each relevant change to one of
/// [`Config::watched_paths`]. Returns only when the watcher shuts down.
///
/// A rebuild is a full build; events that arrive while it runs are dropped
/// once it finishes, so one burst of saves causes one rebuild. A failed
/// rebuild is logged and watching continues.
pub fn watch(config: &Config, mut rebuild: impl FnMut() -> Result<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    for path in config.watched_paths() {
        if !path.exists() {
            debug!("Not watching missing {}", path.display());
            continue;
        }
        let mode = match path.is_dir() {
            true => RecursiveMode::Recursive,
            false => RecursiveMode::NonRecursive,
        };
        watcher
            .watch(path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
    }
    info!("Watching for changes...");

    for event in rx.iter() {
        match event {
            Ok(event) if is_relevant(&event) => {
                if let Some(path) = event.paths.first() {
                    info!("Change detected in {}, rebuilding...", path.display());
                }
                if let Err(err) = rebuild() {
                    error!("Rebuild failed: {:#}", err);
                }
                let dropped = drain(&rx);
                if dropped > 0 {
                    debug!("Dropped {} events queued during rebuild", dropped);
                }
            }
            Ok(_) => {}
            Err(err) => warn!("Watch error: {}", err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(&Event::new(EventKind::Create(CreateKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(is_relevant(&Event::new(EventKind::Remove(RemoveKind::File))));
        assert!(!is_relevant(&Event::new(EventKind::Access(AccessKind::Any))));
    }

    #[test]
    fn test_drain() {
        let (tx, rx) = std::sync::mpsc::channel();
        for i in 0..3 {
            tx.send(i).unwrap();
        }
        assert_eq!(3, drain(&rx));
        assert_eq!(0, drain(&rx));
    }
}
