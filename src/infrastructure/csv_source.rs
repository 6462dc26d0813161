// CSV resource access - local file path or HTTP URL
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CsvSource {
    File(PathBuf),
    Url(String),
}

impl CsvSource {
    /// `http://` and `https://` locations are fetched over the network,
    /// anything else is a path relative to the working directory.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            CsvSource::Url(location.to_string())
        } else {
            CsvSource::File(PathBuf::from(location))
        }
    }

    pub async fn fetch(&self) -> Result<String, FetchError> {
        match self {
            CsvSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            CsvSource::Url(url) => {
                let http_err = |source| FetchError::Http {
                    url: url.clone(),
                    source,
                };
                let response = reqwest::get(url).await.map_err(http_err)?;
                if !response.status().is_success() {
                    return Err(FetchError::Status {
                        url: url.clone(),
                        status: response.status().as_u16(),
                    });
                }
                response.text().await.map_err(http_err)
            }
        }
    }
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSource::File(path) => write!(f, "{}", path.display()),
            CsvSource::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            CsvSource::parse("FixitFast_data.csv"),
            CsvSource::File(PathBuf::from("FixitFast_data.csv"))
        );
        assert_eq!(
            CsvSource::parse("https://example.org/data.csv"),
            CsvSource::Url("https://example.org/data.csv".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let source = CsvSource::parse("no/such/dataset.csv");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let path = std::env::temp_dir().join(format!("fixit-dispatch-{}.csv", std::process::id()));
        tokio::fs::write(&path, "Service Request ID\nSR001\n").await.unwrap();

        let text = CsvSource::File(path.clone()).fetch().await.unwrap();
        assert!(text.starts_with("Service Request ID"));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
