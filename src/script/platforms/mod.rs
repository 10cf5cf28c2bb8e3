//! Per-platform fragment tables and the parameters that fill them.

mod dotnet;
mod golang;
mod hugo;
mod java;
mod node;
mod php;
mod python;
mod ruby;

pub use dotnet::DotNetComposer;
pub use golang::GolangComposer;
pub use hugo::HugoComposer;
pub use java::JavaComposer;
pub use node::NodeComposer;
pub use php::PhpComposer;
pub use python::PythonComposer;
pub use ruby::RubyComposer;
