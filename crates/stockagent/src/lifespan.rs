use std::time::Instant;

use tracing::info;

/// Scoped startup/shutdown banner for the service.
///
/// The shutdown line is logged on drop, so it is emitted however the serve
/// loop exits.
pub struct Lifespan {
    name: &'static str,
    started: Instant,
}

impl Lifespan {
    pub fn start(name: &'static str) -> Self {
        info!("Starting up {name}...");
        Self {
            name,
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Lifespan {
    fn drop(&mut self) {
        info!(
            uptime_secs = self.started.elapsed().as_secs(),
            "Shutting down {}...", self.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_released_at_scope_end() {
        let guard = Lifespan::start("test service");
        assert_eq!(guard.name(), "test service");
        drop(guard);
    }
}
