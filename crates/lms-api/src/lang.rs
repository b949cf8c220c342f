use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use lms_core::i18n::{Lang, Messages};
use serde::Deserialize;

/// Language of the response messages, taken from the `lang` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestLang(pub Lang);

#[derive(Deserialize)]
struct LangQuery {
    #[serde(default)]
    lang: Lang,
}

impl RequestLang {
    pub fn from_parts(parts: &Parts) -> Self {
        Query::<LangQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| Self(q.lang))
            .unwrap_or_default()
    }

    pub fn messages(self) -> &'static Messages {
        self.0.messages()
    }
}

impl<S> FromRequestParts<S> for RequestLang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn lang_of(uri: &str) -> Lang {
        let (parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        RequestLang::from_parts(&parts).0
    }

    #[test]
    fn test_lang_from_query() {
        assert_eq!(lang_of("/courses?lang=en"), Lang::En);
        assert_eq!(lang_of("/courses?x=1&lang=ua"), Lang::Ua);
        assert_eq!(lang_of("/courses"), Lang::Ua);
        assert_eq!(lang_of("/courses?lang=de"), Lang::Ua);
    }
}
