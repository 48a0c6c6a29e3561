mod plan;


pub use plan::{
    DEFAULT_EXECUTION_TIMEOUT, LoadPlan, LoadShape, TIME_LIMIT_MAX_REQUESTS, Target,
};
