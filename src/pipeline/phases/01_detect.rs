use crate::error::BuildError;
use crate::pipeline::context::BuildContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;

pub struct DetectPhase;

#[async_trait]
impl WorkflowPhase for DetectPhase {
    fn name(&self) -> &'static str {
        "detection"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<(), BuildError> {
        let outcome = context
            .detectors
            .detect(context.view, context.options, context.cancel)?;
        context.outcome = Some(outcome);
        Ok(())
    }
}
