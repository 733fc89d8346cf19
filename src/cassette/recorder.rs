//! Builds a cassette in memory and writes it out when the session ends.

use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Collects interactions for one session.
///
/// Image data in recorded inputs is replaced with a length marker; replay
/// only needs the outputs, and the inputs stay readable in review.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    cassette: Cassette,
}

impl CassetteRecorder {
    /// Start a recording that will be written to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            cassette: Cassette {
                name: name.into(),
                recorded_at: Utc::now(),
                commit: commit.into(),
                interactions: Vec::new(),
            },
        }
    }

    /// Append one call. Sequence numbers follow call order across all ports.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        mut input: Value,
        output: Value,
    ) {
        redact_image_data(&mut input);
        let seq = self.cassette.interactions.len() as u64;
        self.cassette.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
    }

    /// Stamp the finish time and write the YAML file, creating directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(mut self) -> Result<PathBuf, std::io::Error> {
        self.cassette.recorded_at = Utc::now();
        let yaml = serde_yaml::to_string(&self.cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        tracing::debug!(
            path = %self.path.display(),
            interactions = self.cassette.interactions.len(),
            "cassette written"
        );
        Ok(self.path)
    }
}

/// Replace every `base64` string field with `<N base64 chars>`.
fn redact_image_data(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                match field {
                    Value::String(data) if key == "base64" => {
                        *data = format!("<{} base64 chars>", data.len());
                    }
                    _ => redact_image_data(field),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_image_data),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_wizard_session() {
        let dir = std::env::temp_dir().join("mockup_cassette_recorder_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "red-mug", "deadbeef");
        recorder.record(
            "image_service",
            "generate_mockup",
            json!({"prompt": "A red mug"}),
            json!({"Ok": "/9j/4AAQ"}),
        );
        recorder.record(
            "image_service",
            "edit_image",
            json!({
                "image": {"base64": "/9j/4AAQ", "mime_type": "image/jpeg"},
                "instruction": "add a retro filter",
            }),
            json!({"Err": "API error (500): boom"}),
        );

        assert_eq!(recorder.finish().unwrap(), path);

        let cassette: Cassette =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cassette.name, "red-mug");
        assert_eq!(cassette.commit, "deadbeef");
        let seqs: Vec<u64> = cassette.interactions.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(cassette.interactions[1].input["instruction"], "add a retro filter");
        assert_eq!(cassette.interactions[1].output["Err"], "API error (500): boom");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn image_inputs_are_redacted() {
        let mut input = json!({
            "mockup": {"base64": "/9j/4AAQSkZJRg==", "mime_type": "image/jpeg"},
            "logo": {"base64": "iVBORw0KGgo=", "mime_type": "image/png"},
            "description": "A red mug",
        });
        redact_image_data(&mut input);

        assert_eq!(input["mockup"]["base64"], "<16 base64 chars>");
        assert_eq!(input["mockup"]["mime_type"], "image/jpeg");
        assert_eq!(input["logo"]["base64"], "<12 base64 chars>");
        assert_eq!(input["logo"]["mime_type"], "image/png");
        assert_eq!(input["description"], "A red mug");
    }

    #[test]
    fn outputs_are_kept_verbatim() {
        let dir = std::env::temp_dir().join("mockup_cassette_recorder_outputs");
        let path = dir.join("out.cassette.yaml");
        let mut recorder = CassetteRecorder::new(&path, "out", "abc");
        recorder.record(
            "image_service",
            "place_logo",
            json!({"mockup": {"base64": "/9j/4AAQ", "mime_type": "image/jpeg"}}),
            json!({"Ok": "iVBORw0KGgo="}),
        );
        recorder.finish().unwrap();

        let cassette: Cassette =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cassette.interactions[0].output["Ok"], "iVBORw0KGgo=");
        assert_eq!(cassette.interactions[0].input["mockup"]["base64"], "<8 base64 chars>");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
