/// Key → localized string lookup.
///
/// Implementations fall back to returning the key itself when it has no translation. The
/// controller receives a translator explicitly through [`crate::ListOptions::with_translator`];
/// there is no process-wide instance.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &[(&str, &str)]) -> String + Send + Sync,
{
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        self(key, params)
    }
}
