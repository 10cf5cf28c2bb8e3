use crate::define_id_enum;

define_id_enum! {
    /// Supported platforms, in detection priority order.
    PlatformId {
        DotNet => "dotnet" : ".NET" | "dotnetcore" | "csharp",
        Node => "nodejs" : "Node.js" | "node",
        Python => "python" : "Python",
        Php => "php" : "PHP",
        Hugo => "hugo" : "Hugo",
        Ruby => "ruby" : "Ruby",
        Java => "java" : "Java",
        Golang => "golang" : "Go" | "golang",
    }
}

impl PlatformId {
    /// Directory under the installed SDK root holding one subdirectory per
    /// installed version.
    pub fn sdk_dir(&self) -> &'static str {
        match self {
            PlatformId::DotNet => "dotnet/sdks",
            PlatformId::Node => "nodejs",
            PlatformId::Python => "python",
            PlatformId::Php => "php",
            PlatformId::Hugo => "hugo",
            PlatformId::Ruby => "ruby",
            PlatformId::Java => "java",
            PlatformId::Golang => "golang",
        }
    }

    /// Prefix for per-platform environment variables such as `NODE_VERSION`
    /// and `DISABLE_NODE_BUILD`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            PlatformId::DotNet => "DOTNET",
            PlatformId::Node => "NODE",
            PlatformId::Python => "PYTHON",
            PlatformId::Php => "PHP",
            PlatformId::Hugo => "HUGO",
            PlatformId::Ruby => "RUBY",
            PlatformId::Java => "JAVA",
            PlatformId::Golang => "GOLANG",
        }
    }

    /// Position in the detection priority order; lower runs first.
    pub fn priority(&self) -> usize {
        Self::all_variants()
            .iter()
            .position(|p| p == self)
            .unwrap_or(usize::MAX)
    }
}
