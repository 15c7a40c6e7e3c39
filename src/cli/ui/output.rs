use console::style;

use crate::pipeline::RunArtifacts;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn item(&self, message: &str) {
        println!(" - {}", message);
    }

    /// Fallback/empty-response warnings followed by the pull request link
    pub fn report(&self, artifacts: &RunArtifacts) {
        for (headline, items) in artifacts.stats.warnings() {
            self.warning(&headline);
            for item in items {
                self.item(item);
            }
        }
        if let Some(url) = &artifacts.pull_request_url {
            self.success(&format!("Pull request created: {}", url));
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
