use crate::Result;
use crate::protocol::chat::{GenerateContentRequest, GenerateContentResponse};
use crate::transport::BoxFuture;
use crate::transport::rest::GeminiRestAdapter;
use futures::stream::BoxStream;

/// Stream of reply chunks for one turn.
pub type ChunkStream = BoxStream<'static, Result<GenerateContentResponse>>;

/// The wire seam under a chat session.
pub trait ChatBackend: Send + Sync {
    fn stream_generate(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> BoxFuture<'_, Result<ChunkStream>>;
}

impl ChatBackend for GeminiRestAdapter {
    fn stream_generate(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> BoxFuture<'_, Result<ChunkStream>> {
        let model = model.to_string();
        Box::pin(async move { self.stream_generate_content(&model, &request).await })
    }
}
