use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use omrbench::exec::{BoxFuture, EnvironmentManager};

/// A fake environment manager that:
/// - knows a fixed set of environment names
/// - records every probe so tests can assert which models were checked.
#[derive(Debug, Clone, Default)]
pub struct FakeEnvironmentManager {
    present: HashSet<String>,
    probed: Arc<Mutex<Vec<String>>>,
}

impl FakeEnvironmentManager {
    pub fn with_envs<I, S>(envs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: envs.into_iter().map(Into::into).collect(),
            probed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the probe log.
    pub fn probes(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.probed)
    }
}

impl EnvironmentManager for FakeEnvironmentManager {
    fn name(&self) -> &str {
        "fake"
    }

    fn exists<'a>(&'a self, env: &'a str) -> BoxFuture<'a, bool> {
        let probed = Arc::clone(&self.probed);
        let found = self.present.contains(env);
        Box::pin(async move {
            probed.lock().unwrap().push(env.to_string());
            found
        })
    }

    fn activation_prefix(&self, env: &str) -> Option<String> {
        Some(format!("fake-activate {env} &&"))
    }
}
