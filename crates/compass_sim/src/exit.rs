use crate::error::Result;
#[cfg(unix)]
use crate::error::SimError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Stop request shared with the frame loop. Clones see the same flag.
#[derive(Debug, Clone, Default)]
pub struct ExitFlag(Arc<AtomicBool>);

impl ExitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT, SIGTERM and SIGHUP (Ctrl+C on windows) to this flag.
    /// The loop finishes its current frame and still writes its outputs.
    pub fn install(&self) -> Result<()> {
        #[cfg(unix)]
        {
            use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

            for signal in [SIGINT, SIGTERM, SIGHUP] {
                signal_hook::flag::register(signal, Arc::clone(&self.0)).map_err(|e| {
                    SimError::SignalHandling {
                        source: Box::new(e),
                    }
                })?;
            }
        }

        #[cfg(windows)]
        {
            let flag = Arc::clone(&self.0);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
        }

        log::debug!("Exit signals routed to the frame loop");
        Ok(())
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
