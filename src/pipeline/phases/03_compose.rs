use crate::error::BuildError;
use crate::pipeline::context::BuildContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;

pub struct ComposePhase;

#[async_trait]
impl WorkflowPhase for ComposePhase {
    fn name(&self) -> &'static str {
        "composition"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<(), BuildError> {
        let platforms: Vec<_> = context
            .outcome
            .iter()
            .flat_map(|outcome| outcome.results.iter().cloned())
            .zip(context.resolved.iter().cloned())
            .collect();

        let script =
            context
                .composers
                .compose_script(&platforms, context.build_options, context.cancel)?;
        context.script = Some(script);
        Ok(())
    }
}
