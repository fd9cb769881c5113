pub mod dataframe;
pub mod error;
pub mod expression;
pub mod function;
pub mod printer;
pub mod report;
pub mod script;
pub mod syntax;
pub mod value;

pub use dataframe::DataFrame;
pub use error::{EngineError, Result};
pub use expression::{DataSet, EvalContext, Expression, Script, SimpleEvalContext};
pub use function::{FunctionDescriptor, FunctionRegistry};
pub use script::{run_script, run_script_file};
pub use value::{Value, ValueType};
