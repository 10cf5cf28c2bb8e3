use super::context::BuildContext;
use crate::error::BuildError;
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<(), BuildError>;
}
