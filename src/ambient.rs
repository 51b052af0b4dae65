//! Ambient-generator convenience layer: the explicit `&mut CircuitGenerator`
//! API in `crate::generator` is the primary, tested surface. This module
//! exists only to satisfy callers that expect a gadget function to reach an
//! active generator without it being passed in.
//!
//! Single-generator mode keeps one process-wide slot; multi-generator mode
//! keys the slot by the calling thread, which `thread_local!` gives us for
//! free (no `HashMap<ThreadId, _>` bookkeeping needed). Both modes share the
//! same `Arc<Mutex<_>>` handle type so the process-wide slot can be a plain
//! `Send + Sync` static.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use crate::error::{CircuitError, Result};
use crate::generator::CircuitGenerator;

pub type SharedGenerator = Arc<Mutex<CircuitGenerator>>;

thread_local! {
    static PER_THREAD: RefCell<Option<SharedGenerator>> = const { RefCell::new(None) };
}

static SINGLE: Mutex<Option<SharedGenerator>> = Mutex::new(None);

/// Installs `generator` as the active one for the current scope, restoring
/// whatever was previously active (if anything) on drop.
pub struct ActiveGuard {
    multi: bool,
    previous: Option<SharedGenerator>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if self.multi {
            PER_THREAD.with(|cell| *cell.borrow_mut() = self.previous.take());
        } else {
            *SINGLE.lock().unwrap() = self.previous.take();
        }
    }
}

/// Activates `generator` for the current scope (current thread if
/// `multi_generators`, the whole process otherwise).
pub fn activate(generator: SharedGenerator, multi_generators: bool) -> ActiveGuard {
    let previous = if multi_generators {
        PER_THREAD.with(|cell| cell.borrow_mut().replace(generator))
    } else {
        SINGLE.lock().unwrap().replace(generator)
    };
    ActiveGuard {
        multi: multi_generators,
        previous,
    }
}

/// Runs `f` against the currently active generator, looked up by the same
/// `multi_generators` policy used at `activate` time.
pub fn with_active_generator<R>(
    multi_generators: bool,
    f: impl FnOnce(&mut CircuitGenerator) -> R,
) -> Result<R> {
    let active = if multi_generators {
        PER_THREAD.with(|cell| cell.borrow().clone())
    } else {
        SINGLE.lock().unwrap().clone()
    };
    let generator = active.ok_or_else(|| {
        CircuitError::configuration("no active circuit generator for this thread/scope")
    })?;
    Ok(f(&mut generator.lock().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitConfig;

    #[test]
    fn no_active_generator_is_a_configuration_error() {
        let result = with_active_generator(true, |gen| gen.num_constraints());
        assert!(result.is_err());
    }

    #[test]
    fn activate_scopes_to_the_guard_lifetime() {
        let gen = Arc::new(Mutex::new(CircuitGenerator::new(CircuitConfig::default())));
        {
            let _guard = activate(gen.clone(), true);
            let count = with_active_generator(true, |g| g.num_constraints()).unwrap();
            assert_eq!(count, 0);
        }
        assert!(with_active_generator(true, |g| g.num_constraints()).is_err());
    }
}
