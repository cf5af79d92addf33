//! Pipeline persistence and extract runner endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::{RequestConfig, ServiceClient, Transport};
use crate::assembly::{LoadConfig, PipelineConfig};
use crate::error::{DesignerError, Result, ResultExt};

/// Column description returned by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseColumn {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    #[serde(default)]
    pub max_length: Option<u64>,
    #[serde(default)]
    pub is_auto_increment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseTable {
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<DatabaseColumn>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<Value>,
}

impl DatabaseTable {
    pub fn column(&self, name: &str) -> Option<&DatabaseColumn> {
        self.columns.iter().find(|c| c.column_name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    #[serde(default)]
    pub tables: Vec<DatabaseTable>,
}

impl DatabaseMetadata {
    pub fn table(&self, name: &str) -> Option<&DatabaseTable> {
        self.tables.iter().find(|t| t.table_name == name)
    }
}

/// Client for the pipeline persistence API.
pub struct PipelineService<T: Transport> {
    client: ServiceClient<T>,
}

impl<T: Transport> PipelineService<T> {
    pub fn new(client: ServiceClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<PipelineConfig>> {
        self.client
            .get(RequestConfig::endpoint("Pipeline").header("accept", "text/plain"))?
            .deserialize()
            .context("Failed to read pipeline list")
    }

    pub fn get(&self, id: &str) -> Result<PipelineConfig> {
        self.client
            .get(RequestConfig::endpoint(resource_path("Pipeline", id)?))?
            .deserialize()
            .with_context(|| format!("Failed to read pipeline '{}'", id))
    }

    pub fn save(&self, config: &PipelineConfig) -> Result<()> {
        let content = serde_json::to_value(config)?;
        self.client
            .post(RequestConfig::endpoint("Pipeline").content(content))?;
        tracing::info!("Saved pipeline '{}'", config.id);
        Ok(())
    }

    pub fn update(&self, id: &str, config: &PipelineConfig) -> Result<()> {
        let content = serde_json::to_value(config)?;
        self.client
            .put(RequestConfig::endpoint(resource_path("Pipeline", id)?).content(content))?;
        tracing::info!("Updated pipeline '{}'", id);
        Ok(())
    }

    /// Ask the backend whether the load target is reachable.
    pub fn validate_load(&self, config: &LoadConfig) -> Result<bool> {
        let body = self
            .client
            .post(RequestConfig::endpoint("Pipeline/validate").content(target_content(config)))?;
        let reply: Value = body.deserialize()?;
        match reply.get("isValid").and_then(Value::as_bool) {
            Some(valid) => Ok(valid),
            None => {
                tracing::warn!("Validation reply has no 'isValid' flag: {}", reply);
                Ok(false)
            }
        }
    }

    /// Tables and columns of the load target.
    pub fn load_metadata(&self, config: &LoadConfig) -> Result<DatabaseMetadata> {
        self.client
            .post(RequestConfig::endpoint("Pipeline/metadata").content(target_content(config)))?
            .deserialize()
            .context("Failed to read database metadata")
    }
}

/// `collection/id`, with `id` percent-encoded as a single path segment.
fn resource_path(collection: &str, id: &str) -> Result<String> {
    let mut url = reqwest::Url::parse("http://localhost/")
        .map_err(|e| DesignerError::ConfigurationUsage(format!("Invalid resource base: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| DesignerError::ConfigurationUsage("Resource base cannot hold a path".to_string()))?
        .pop_if_empty()
        .push(collection)
        .push(id);
    Ok(url.path().trim_start_matches('/').to_string())
}

fn target_content(config: &LoadConfig) -> Value {
    json!({
        "connectionString": config.target_info.connection_string,
        "type": config.target_info.kind.as_str(),
    })
}

/// Client for the extract runner.
pub struct ExtractService<T: Transport> {
    client: ServiceClient<T>,
}

impl<T: Transport> ExtractService<T> {
    pub fn new(client: ServiceClient<T>) -> Self {
        Self { client }
    }

    /// Start a saved pipeline.
    pub fn start_pipeline(&self, id: &str) -> Result<()> {
        self.client
            .post(RequestConfig::endpoint(resource_path("extract", id)?))?;
        tracing::info!("Started pipeline '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{DatabaseKind, LoadMode, TargetInfo};
    use crate::error::DesignerError;
    use crate::service::client::{HttpResponse, Method, MockTransport};

    const BASE: &str = "https://localhost:7027/api/";

    fn load_config() -> LoadConfig {
        LoadConfig {
            target_info: TargetInfo {
                kind: DatabaseKind::Mysql,
                connection_string: "Server=db".to_string(),
                load_mode: LoadMode::Append,
            },
            tables: Vec::new(),
        }
    }

    #[test]
    fn test_list_reads_text_plain_json() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.url.starts_with("https://localhost:7027/api/Pipeline?_=")
                    && req.headers.contains(&("accept".to_string(), "text/plain".to_string()))
            })
            .returning(|_| {
                Ok(HttpResponse::text(
                    200,
                    r#"[{"Id":"p1",
                        "ExtractConfig":{"SourceInfo":{"$type":"api","Url":"https://x"}},
                        "TransformConfig":{},
                        "LoadConfig":{"TargetInfo":{"$type":"mysql","ConnectionString":"c"}}}]"#,
                ))
            });

        let pipelines = PipelineService::new(ServiceClient::new(BASE, mock)).list().unwrap();
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].id, "p1");
    }

    #[test]
    fn test_validate_posts_connection() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.url == "https://localhost:7027/api/Pipeline/validate"
                    && req.body.as_deref() == Some(r#"{"connectionString":"Server=db","type":"mysql"}"#)
            })
            .returning(|_| Ok(HttpResponse::json(200, r#"{"isValid":true}"#)));

        let service = PipelineService::new(ServiceClient::new(BASE, mock));
        assert!(service.validate_load(&load_config()).unwrap());
    }

    #[test]
    fn test_validate_logical_failure() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Ok(HttpResponse::json(200, r#"{"success":false,"message":"Access denied"}"#))
        });

        let service = PipelineService::new(ServiceClient::new(BASE, mock));
        let err = service.validate_load(&load_config()).unwrap_err();
        assert!(matches!(err, DesignerError::Transport(_)));
        assert_eq!(err.user_message(), "Access denied");
    }

    #[test]
    fn test_load_metadata() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.url == "https://localhost:7027/api/Pipeline/metadata")
            .returning(|_| {
                Ok(HttpResponse::json(
                    200,
                    r#"{"tables":[{"tableName":"movies","columns":[
                        {"columnName":"id","dataType":"int","isNullable":false,
                         "maxLength":null,"isAutoIncrement":true}],
                        "primaryKeys":["id"],"foreignKeys":[]}]}"#,
                ))
            });

        let service = PipelineService::new(ServiceClient::new(BASE, mock));
        let metadata = service.load_metadata(&load_config()).unwrap();
        let table = metadata.table("movies").unwrap();
        assert_eq!(table.primary_keys, vec!["id"]);
        assert!(table.column("id").unwrap().is_auto_increment);
    }

    #[test]
    fn test_start_pipeline() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.url == "https://localhost:7087/api/extract/p1"
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::text(202, "")));

        let service = ExtractService::new(ServiceClient::new("https://localhost:7087/api/", mock));
        service.start_pipeline("p1").unwrap();
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        assert_eq!(resource_path("Pipeline", "p1").unwrap(), "Pipeline/p1");
        assert_eq!(
            resource_path("Pipeline", "a/b?c#d").unwrap(),
            "Pipeline/a%2Fb%3Fc%23d"
        );

        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.url == "https://localhost:7087/api/extract/nightly%2Fmovies")
            .times(1)
            .returning(|_| Ok(HttpResponse::text(202, "")));
        let service = ExtractService::new(ServiceClient::new("https://localhost:7087/api/", mock));
        service.start_pipeline("nightly/movies").unwrap();
    }

    #[test]
    fn test_get_not_found() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(HttpResponse::text(404, "Not Found")));

        let service = PipelineService::new(ServiceClient::new(BASE, mock));
        let err = service.get("missing").unwrap_err();
        assert_eq!(err.user_message(), "HTTP 404: Not Found");
    }
}
