//! Test data builders for creating test objects

use etl_designer::assembly::{
    DatabaseKind, ExtractConfig, LoadConfig, LoadMode, MappingRule, PipelineConfig, SourceInfo,
    SourceKind, TableMapping, TargetInfo, TransformConfig,
};
use etl_designer::schema::RuleKey;
use serde_json::{json, Value};

/// Builder for creating test pipeline configurations
pub struct PipelineBuilder {
    id: String,
    url: String,
    fields: Vec<String>,
    mappings: Vec<MappingRule>,
    tables: Vec<TableMapping>,
}

impl PipelineBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            url: "https://api.example.com/movies".to_string(),
            fields: Vec::new(),
            mappings: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn field(mut self, path: &str) -> Self {
        self.fields.push(path.to_string());
        self
    }

    pub fn rename(mut self, source: &str, target: &str) -> Self {
        self.mappings.push(MappingRule {
            source_field: source.to_string(),
            target_field: target.to_string(),
            rule_key: Some(RuleKey::ChangeName),
        });
        self
    }

    pub fn table(mut self, table: &str, fields: &[&str]) -> Self {
        self.tables.push(TableMapping {
            target_table: table.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> PipelineConfig {
        PipelineConfig {
            id: self.id,
            extract_config: ExtractConfig {
                source_info: SourceInfo {
                    kind: SourceKind::Api,
                    url: self.url,
                    headers: Default::default(),
                },
                fields: self.fields,
                filters: Vec::new(),
            },
            transform_config: TransformConfig {
                mappings: self.mappings,
                filters: Vec::new(),
            },
            load_config: LoadConfig {
                target_info: TargetInfo {
                    kind: DatabaseKind::Mysql,
                    connection_string: "Server=localhost;Database=movies".to_string(),
                    load_mode: LoadMode::Append,
                },
                tables: self.tables,
            },
        }
    }
}

/// A movie listing shaped like a typical paginated REST reply
pub fn movie_sample() -> Value {
    json!({
        "page": 1,
        "results": [
            {"id": 550, "title": "Fight Club", "vote_average": 8.4, "adult": false},
            {"id": 680, "title": "Pulp Fiction", "vote_average": 8.5, "adult": false}
        ],
        "total_pages": 42
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let config = PipelineBuilder::new("movies")
            .field("results.title")
            .rename("results.title", "name")
            .table("films", &["name"])
            .build();

        assert_eq!(config.id, "movies");
        assert_eq!(config.extract_config.fields, vec!["results.title"]);
        assert_eq!(config.transform_config.mappings[0].target_field, "name");
        assert_eq!(config.load_config.tables[0].target_table, "films");
    }
}
