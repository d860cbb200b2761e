use minijinja::{context, AutoEscape, Environment};

use crate::llm::models::{ExplainSqlRequest, GenerateSqlRequest, TransformSqlRequest};
use crate::llm::LlmError;

const GENERATE_SYSTEM: &str = "You are an expert SQL developer. Generate optimized SQL queries based on natural language descriptions. Always respond with valid JSON in the specified format.";
const TRANSFORM_SYSTEM: &str =
    "You are an expert SQL developer specializing in database migration and query optimization.";
const EXPLAIN_SYSTEM: &str = "You are an expert SQL educator and performance analyst. Provide clear, educational explanations of SQL queries.";

/// One chat-completion exchange: a system message, a user message and a sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

pub struct PromptTemplates {
    env: Environment<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self, LlmError> {
        let mut env = Environment::new();
        // Prompts are plain text; SQL must reach the model unescaped
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_template("generate_sql", include_str!("../../templates/generate_sql.txt"))?;
        env.add_template("transform_sql", include_str!("../../templates/transform_sql.txt"))?;
        env.add_template("explain_sql", include_str!("../../templates/explain_sql.txt"))?;

        Ok(Self { env })
    }

    pub fn generate(&self, request: &GenerateSqlRequest) -> Result<ChatPrompt, LlmError> {
        let options = request.options.clone().unwrap_or_default();
        let user = self.env.get_template("generate_sql")?.render(context! {
            query => request.natural_language_query,
            database => request.database(),
            subject => request.subject,
            analysis_type => request.analysis_type,
            limit => options.limit,
            sort_order => options.sort_order.unwrap_or_default().as_str(),
            optimization_level => options.optimization_level.unwrap_or_default().as_str(),
        })?;

        Ok(ChatPrompt {
            system: GENERATE_SYSTEM.to_string(),
            user,
            temperature: 0.3,
        })
    }

    pub fn transform(&self, request: &TransformSqlRequest) -> Result<ChatPrompt, LlmError> {
        let user = self.env.get_template("transform_sql")?.render(context! {
            original_sql => request.original_sql,
            target_database => request.target_database,
            optimization_level => request.optimization_level.unwrap_or_default().as_str(),
        })?;

        Ok(ChatPrompt {
            system: TRANSFORM_SYSTEM.to_string(),
            user,
            temperature: 0.2,
        })
    }

    pub fn explain(&self, request: &ExplainSqlRequest) -> Result<ChatPrompt, LlmError> {
        let user = self
            .env
            .get_template("explain_sql")?
            .render(context! { sql => request.sql })?;

        Ok(ChatPrompt {
            system: EXPLAIN_SYSTEM.to_string(),
            user,
            temperature: 0.3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::{GenerateOptions, OptimizationLevel, SortOrder};

    fn templates() -> PromptTemplates {
        PromptTemplates::new().unwrap()
    }

    #[test]
    fn generate_prompt_falls_back_to_general_defaults() {
        let request = GenerateSqlRequest {
            natural_language_query: "monthly revenue".to_string(),
            database: None,
            subject: None,
            analysis_type: None,
            options: None,
        };

        let prompt = templates().generate(&request).unwrap();
        assert_eq!(prompt.temperature, 0.3);
        assert!(prompt.system.contains("expert SQL developer"));
        assert!(prompt.user.contains("Query: \"monthly revenue\""));
        assert!(prompt.user.contains("Database: MySQL"));
        assert!(prompt.user.contains("Subject Area: General"));
        assert!(prompt.user.contains("Analysis Type: General"));
        assert!(prompt.user.contains("- Limit: No limit specified"));
        assert!(prompt.user.contains("- Sort Order: auto"));
        assert!(prompt.user.contains("- Optimization Level: standard"));
    }

    #[test]
    fn generate_prompt_includes_options() {
        let request = GenerateSqlRequest {
            natural_language_query: "top products".to_string(),
            database: Some("PostgreSQL".to_string()),
            subject: Some("sales".to_string()),
            analysis_type: Some("ranking".to_string()),
            options: Some(GenerateOptions {
                limit: Some(10),
                sort_order: Some(SortOrder::Desc),
                optimization_level: Some(OptimizationLevel::Readability),
            }),
        };

        let prompt = templates().generate(&request).unwrap();
        assert!(prompt.user.contains("Database: PostgreSQL"));
        assert!(prompt.user.contains("best practices for PostgreSQL"));
        assert!(prompt.user.contains("Subject Area: sales"));
        assert!(prompt.user.contains("- Limit: 10"));
        assert!(prompt.user.contains("- Sort Order: desc"));
        assert!(prompt.user.contains("- Optimization Level: readability"));
    }

    #[test]
    fn transform_prompt_keeps_sql_unescaped() {
        let request = TransformSqlRequest {
            original_sql: "SELECT * FROM t WHERE a < 'x' && b > 1".to_string(),
            target_database: "SQLite".to_string(),
            optimization_level: None,
        };

        let prompt = templates().transform(&request).unwrap();
        assert_eq!(prompt.temperature, 0.2);
        assert!(prompt.user.contains("SELECT * FROM t WHERE a < 'x' && b > 1"));
        assert!(prompt.user.contains("for SQLite database with standard optimization level"));
    }

    #[test]
    fn explain_prompt_embeds_query() {
        let request = ExplainSqlRequest {
            sql: "SELECT COUNT(*) FROM orders".to_string(),
        };

        let prompt = templates().explain(&request).unwrap();
        assert!(prompt.user.contains("SELECT COUNT(*) FROM orders"));
        assert!(prompt.user.contains("\"breakdown\""));
        assert!(prompt.system.contains("educator"));
    }
}
