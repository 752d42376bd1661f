pub mod catalog;
pub mod chat_session;
pub mod data_context;
pub mod error;
pub mod relay_client;
pub mod statistics;
pub mod upload_progress;

pub use catalog::DatasetCatalog;
pub use chat_session::{ChatMessage, ChatSession, ChatState, Role};
pub use data_context::{DataContext, DataTable};
pub use error::{AnalysisError, StatisticsError};
pub use relay_client::{Insight, RelayClient};
pub use statistics::{analyze, analyze_raw, StatisticsReport, StatisticsResult};
pub use upload_progress::{UploadProgress, UploadSimulator, UploadStatus};
