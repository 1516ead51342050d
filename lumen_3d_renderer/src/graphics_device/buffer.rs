/// Buffer trait

/// Buffer resource trait
///
/// Geometry produced by the asset layer reaches the pipeline as
/// `Arc<dyn Buffer>` vertex buffers.
pub trait Buffer: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;
}
