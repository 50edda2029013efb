//! Panic isolation for plugin-supplied callbacks

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a plugin callback, turning a panic into an error message
///
/// Callers report the returned message through `error!`. The process panic
/// hook is left in place, so the default hook still prints the panic and its
/// backtrace to stderr as well.
///
/// Callers must not hold any host lock while the callback runs.
pub fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_passes_values_through() {
        assert_eq!(guarded(|| 7), Ok(7));
    }

    #[test]
    fn test_guarded_catches_panics() {
        let result: Result<(), String> = guarded(|| panic!("plugin blew up"));
        assert_eq!(result, Err("plugin blew up".to_string()));
    }
}
