use std::sync::Arc;

use crate::pipeline::ScoringPipeline;
use crate::retrieval::{EntityProvider, RetrievalService};
use crate::store::EntityStore;

/// Shared state handed to every gateway handler.
pub struct HandlerState<P: EntityProvider + 'static> {
    pub service: Arc<RetrievalService<P>>,

    pub store: Arc<dyn EntityStore>,

    pub pipeline: Arc<ScoringPipeline>,
}

impl<P: EntityProvider + 'static> Clone for HandlerState<P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            store: Arc::clone(&self.store),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<P: EntityProvider + 'static> HandlerState<P> {
    pub fn new(
        service: Arc<RetrievalService<P>>,
        store: Arc<dyn EntityStore>,
        pipeline: Arc<ScoringPipeline>,
    ) -> Self {
        Self {
            service,
            store,
            pipeline,
        }
    }
}
