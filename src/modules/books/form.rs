use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};

use bookshare_http::{ApiJson, AppError};

use super::models::BookFields;
use crate::uploads::CoverUpload;

/// Name of the multipart part carrying the cover image.
pub const COVER_FIELD: &str = "coverImage";

/// Listing fields plus an optional cover, from either a
/// `multipart/form-data` body or a JSON body.
#[derive(Debug, Default)]
pub struct BookForm {
    pub fields: BookFields,
    pub cover: Option<CoverUpload>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for BookForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let ApiJson(fields) = ApiJson::<BookFields>::from_request(req, state).await?;
            return Ok(Self {
                fields,
                cover: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == COVER_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;
                if !bytes.is_empty() {
                    form.cover = Some(CoverUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            form.fields.set(&name, value);
        }

        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    const BOUNDARY: &str = "bookshare-boundary";

    fn multipart_body() -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nDune\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"city\"\r\n\r\nLas Vegas\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"dune.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        )
    }

    #[tokio::test]
    async fn reads_multipart_fields_and_cover() {
        let req = http::Request::post("/")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body()))
            .unwrap();

        let form = BookForm::from_request(req, &()).await.unwrap();
        assert_eq!(form.fields.title.as_deref(), Some("Dune"));
        assert_eq!(form.fields.city.as_deref(), Some("Las Vegas"));

        let cover = form.cover.unwrap();
        assert_eq!(cover.file_name.as_deref(), Some("dune.png"));
        assert_eq!(cover.content_type.as_deref(), Some("image/png"));
        assert_eq!(&cover.bytes[..], b"PNGDATA");
    }

    #[tokio::test]
    async fn reads_json_fields() {
        let req = http::Request::post("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Emma","status":"rented"}"#))
            .unwrap();

        let form = BookForm::from_request(req, &()).await.unwrap();
        assert_eq!(form.fields.title.as_deref(), Some("Emma"));
        assert_eq!(form.fields.status.as_deref(), Some("rented"));
        assert!(form.cover.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = http::Request::post("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = BookForm::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
