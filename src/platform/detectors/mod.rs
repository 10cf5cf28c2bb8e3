//! One detector per supported platform.

mod dotnet;
mod golang;
mod hugo;
mod java;
mod node;
mod php;
mod python;
mod ruby;

pub use dotnet::DotNetDetector;
pub use golang::GolangDetector;
pub use hugo::HugoDetector;
pub use java::JavaDetector;
pub use node::NodeDetector;
pub use php::PhpDetector;
pub use python::PythonDetector;
pub use ruby::RubyDetector;
