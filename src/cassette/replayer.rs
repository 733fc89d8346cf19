//! Serves recorded interactions back in order.

use std::collections::{BTreeSet, HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Per `(port, method)` queues drained front to back.
///
/// Calls through different methods may interleave freely; only the order
/// within one method has to match the recording.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Index a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Take the next interaction for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette never recorded that method, or all
    /// of its interactions have already been served.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let available: BTreeSet<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available: [{}]",
                available.into_iter().collect::<Vec<_>>().join(", ")
            ));
        };

        queue.pop_front().ok_or_else(|| {
            format!("Cassette exhausted: every recorded {port}::{method} call has been replayed.")
        })
    }
}
