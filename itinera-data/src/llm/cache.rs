//! On-disk memoisation of translations.

use camino::{Utf8Path, Utf8PathBuf};
use itinera_core::{NaturalLanguageQuery, Query, TranslationError, Translator};
use itinera_fs::{JsonFileError, file_exists, read_json, write_json};

/// [`Translator`] wrapper storing each translated query as JSON.
///
/// Queries live at `{cache_root}/translation_{label}/{uid}.json`, where the
/// label usually names the model. With cache loading enabled a stored query
/// is returned without consulting the inner translator; otherwise every
/// request is translated afresh and the file overwritten. Failed
/// translations are not stored.
///
/// # Examples
/// ```
/// use itinera_core::test_support::ScriptedCompletionClient;
/// use itinera_core::{NaturalLanguageQuery, Translator};
/// use itinera_data::llm::{CachedTranslator, LlmTranslator};
///
/// let dir = tempfile::tempdir()?;
/// let root = camino::Utf8Path::from_path(dir.path()).ok_or("non-UTF-8 temp dir")?;
/// let answer = r#"{"start_city": "Shanghai", "target_city": "Suzhou",
///                  "people_number": 1, "days": 1}"#;
/// let inner = LlmTranslator::new(ScriptedCompletionClient::new([answer]));
/// let cached = CachedTranslator::new(inner, root, "scripted");
/// let request = NaturalLanguageQuery { uid: "q1".into(), text: "A day in Suzhou".into() };
///
/// let first = cached.translate(&request)?;
/// // The script is exhausted; the second answer comes from disk.
/// assert_eq!(cached.translate(&request)?, first);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct CachedTranslator<T> {
    inner: T,
    dir: Utf8PathBuf,
    load_cache: bool,
}

impl<T: Translator> CachedTranslator<T> {
    /// Cache `inner` under `cache_root`, loading stored queries.
    #[must_use]
    pub fn new(inner: T, cache_root: &Utf8Path, label: &str) -> Self {
        Self {
            inner,
            dir: cache_root.join(format!("translation_{}", file_stem(label))),
            load_cache: true,
        }
    }

    /// Choose whether stored queries are reused.
    #[must_use]
    pub const fn with_load_cache(mut self, load_cache: bool) -> Self {
        self.load_cache = load_cache;
        self
    }

    /// Directory holding this cache's files.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// File that stores the translation of `uid`.
    #[must_use]
    pub fn entry_path(&self, uid: &str) -> Utf8PathBuf {
        self.dir.join(format!("{}.json", file_stem(uid)))
    }

    fn load(&self, uid: &str, path: &Utf8Path) -> Result<Option<Query>, TranslationError> {
        if !self.load_cache || !file_exists(path).map_err(|err| cache_error(uid, err))? {
            return Ok(None);
        }
        read_json(path)
            .map(Some)
            .map_err(|err: JsonFileError| cache_error(uid, err))
    }
}

/// Replace characters that cannot appear in a portable file name.
fn file_stem(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn cache_error(
    uid: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> TranslationError {
    TranslationError::Cache {
        uid: uid.to_owned(),
        source: Box::new(err),
    }
}

impl<T: Translator> Translator for CachedTranslator<T> {
    fn translate(&self, request: &NaturalLanguageQuery) -> Result<Query, TranslationError> {
        let path = self.entry_path(&request.uid);
        if let Some(query) = self.load(&request.uid, &path)? {
            log::debug!("{}: translation loaded from {path}", request.uid);
            return Ok(query);
        }
        let query = self.inner.translate(request)?;
        write_json(&path, &query).map_err(|err| cache_error(&request.uid, err))?;
        log::debug!("{}: translation stored at {path}", request.uid);
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::test_support::ScriptedCompletionClient;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use crate::llm::LlmTranslator;

    const ANSWER: &str = r#"{"start_city": "Shanghai", "target_city": "Suzhou",
        "people_number": 2, "days": 2, "budget": 1500}"#;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    fn root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir")
    }

    fn request(uid: &str) -> NaturalLanguageQuery {
        NaturalLanguageQuery {
            uid: uid.to_owned(),
            text: "Two days in Suzhou".to_owned(),
        }
    }

    fn translator(answers: &[&str]) -> LlmTranslator<ScriptedCompletionClient> {
        LlmTranslator::new(ScriptedCompletionClient::new(answers.iter().copied()))
    }

    #[rstest]
    fn stores_translations_under_the_label(temp_dir: TempDir) {
        let cached = CachedTranslator::new(translator(&[ANSWER]), &root(&temp_dir), "DeepSeek-V3");
        let query = cached.translate(&request("q/1")).expect("translation");
        let path = cached.entry_path("q/1");
        assert!(path.ends_with("translation_DeepSeek-V3/q_1.json"));
        let stored: Query = read_json(&path).expect("stored query");
        assert_eq!(stored, query);
    }

    #[rstest]
    fn reuses_stored_translations(temp_dir: TempDir) {
        let cached = CachedTranslator::new(translator(&[ANSWER]), &root(&temp_dir), "m");
        let first = cached.translate(&request("q1")).expect("first");
        let second = cached.translate(&request("q1")).expect("second from disk");
        assert_eq!(first, second);
    }

    #[rstest]
    fn refreshes_when_loading_is_disabled(temp_dir: TempDir) {
        let two_people = ANSWER;
        let three_people = ANSWER.replace("\"people_number\": 2", "\"people_number\": 3");
        let cached = CachedTranslator::new(
            translator(&[two_people, three_people.as_str()]),
            &root(&temp_dir),
            "m",
        )
        .with_load_cache(false);
        cached.translate(&request("q1")).expect("first");
        let refreshed = cached.translate(&request("q1")).expect("second");
        assert_eq!(refreshed.people, 3);
        let stored: Query = read_json(&cached.entry_path("q1")).expect("stored query");
        assert_eq!(stored.people, 3);
    }

    #[rstest]
    fn failed_translations_are_not_stored(temp_dir: TempDir) {
        let cached = CachedTranslator::new(translator(&[]), &root(&temp_dir), "m");
        assert!(cached.translate(&request("q1")).is_err());
        assert!(!file_exists(&cached.entry_path("q1")).expect("probe"));
    }

    #[rstest]
    fn corrupt_entries_surface_as_cache_errors(temp_dir: TempDir) {
        let cached = CachedTranslator::new(translator(&[ANSWER]), &root(&temp_dir), "m");
        itinera_fs::write_string(&cached.entry_path("q1"), "{").expect("write corrupt entry");
        assert!(matches!(
            cached.translate(&request("q1")),
            Err(TranslationError::Cache { ref uid, .. }) if uid == "q1"
        ));
    }
}
