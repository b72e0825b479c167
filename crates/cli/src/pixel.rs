//! Pixel senders used by the CLI.

use std::sync::Mutex;
use std::thread::JoinHandle;

use msq_adapter_common::winning::PixelSender;

/// Fires each pixel on its own detached thread.
///
/// Outcomes are only logged. [`UreqPixelSender::drain`] lets the process wait
/// for in-flight pixels before exiting.
#[derive(Default)]
pub struct UreqPixelSender {
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl UreqPixelSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every pixel fired so far.
    pub fn drain(&self) {
        let handles = match self.in_flight.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for handle in handles {
            if handle.join().is_err() {
                log::warn!("Pixel thread panicked");
            }
        }
    }
}

impl PixelSender for UreqPixelSender {
    fn fire(&self, url: &str) {
        let url = url.to_string();
        let handle = std::thread::spawn(move || match ureq::get(&url).call() {
            Ok(response) => log::debug!("Pixel {} answered {}", url, response.status()),
            Err(e) => log::debug!("Pixel {} failed: {}", url, e),
        });

        match self.in_flight.lock() {
            Ok(mut handles) => handles.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }
}

/// Prints pixel URLs instead of requesting them.
#[derive(Default)]
pub struct DryRunPixelSender {
    printed: Mutex<Vec<String>>,
}

impl DryRunPixelSender {
    pub fn printed(&self) -> Vec<String> {
        match self.printed.lock() {
            Ok(printed) => printed.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PixelSender for DryRunPixelSender {
    fn fire(&self, url: &str) {
        println!("[Dry Run] Would fire pixel: {}", url);
        match self.printed.lock() {
            Ok(mut printed) => printed.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}
