//! Target platform descriptor.
//!
//! Only `os` takes part in conditional resolution. The remaining fields are
//! carried through so callers can log and serialize the full setting tuple.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::{RecipeError, RecipeResult};

/// Recognized operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Os {
    Linux,
    Macos,
    Windows,
    #[serde(rename = "iOS")]
    Ios,
    Android,
    #[serde(rename = "FreeBSD")]
    FreeBsd,
}

impl Os {
    pub const ALL: [Os; 6] = [
        Os::Linux,
        Os::Macos,
        Os::Windows,
        Os::Ios,
        Os::Android,
        Os::FreeBsd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::Windows => "Windows",
            Os::Ios => "iOS",
            Os::Android => "Android",
            Os::FreeBsd => "FreeBSD",
        }
    }

    /// Detect the host operating system.
    pub fn host() -> RecipeResult<Self> {
        match std::env::consts::OS {
            "linux" => Ok(Os::Linux),
            "macos" => Ok(Os::Macos),
            "windows" => Ok(Os::Windows),
            "ios" => Ok(Os::Ios),
            "android" => Ok(Os::Android),
            "freebsd" => Ok(Os::FreeBsd),
            other => Err(RecipeError::unsupported_platform("os", other)),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Macos),
            "windows" => Ok(Os::Windows),
            "ios" => Ok(Os::Ios),
            "android" => Ok(Os::Android),
            "freebsd" => Ok(Os::FreeBsd),
            _ => Err(RecipeError::unsupported_platform("os", s)),
        }
    }
}

/// CMake-style build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(RecipeError::unsupported_platform("build_type", s)),
        }
    }
}

/// The setting tuple a configuration is resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformDescriptor {
    pub os: Os,
    /// Compiler family (gcc, clang, apple-clang, msvc)
    pub compiler: String,
    /// CPU architecture (x86_64, armv8, ...)
    pub arch: String,
    pub build_type: BuildType,
}

impl PlatformDescriptor {
    /// Create a descriptor for `os` with that system's usual compiler.
    pub fn new(os: Os) -> Self {
        let compiler = match os {
            Os::Macos | Os::Ios => "apple-clang",
            Os::Windows => "msvc",
            Os::Android | Os::FreeBsd => "clang",
            Os::Linux => "gcc",
        };

        PlatformDescriptor {
            os,
            compiler: compiler.to_string(),
            arch: "x86_64".to_string(),
            build_type: BuildType::default(),
        }
    }

    /// Detect the host platform.
    pub fn host() -> RecipeResult<Self> {
        let mut platform = PlatformDescriptor::new(Os::host()?);
        platform.arch = std::env::consts::ARCH.to_string();
        Ok(platform)
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Set one field from a `field=value` pair.
    pub fn set(&mut self, field: &str, value: &str) -> RecipeResult<()> {
        match field.trim() {
            "os" => self.os = value.parse()?,
            "build_type" => self.build_type = value.parse()?,
            "compiler" => self.compiler = value.trim().to_string(),
            "arch" => self.arch = value.trim().to_string(),
            other => {
                return Err(RecipeError::configuration(
                    other,
                    "unknown setting, expected one of: os, compiler, arch, build_type",
                ))
            }
        }
        Ok(())
    }

    /// Apply a `field=value` assignment as given on the command line.
    pub fn assign(&mut self, assignment: &str) -> RecipeResult<()> {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            RecipeError::configuration(
                assignment.trim(),
                "expected a setting of the form `field=value`",
            )
        })?;
        self.set(field, value)
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parsing() {
        assert_eq!("Linux".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!("iOS".parse::<Os>().unwrap(), Os::Ios);
        assert_eq!("macOS".parse::<Os>().unwrap(), Os::Macos);

        let err = "Plan9".parse::<Os>().unwrap_err();
        assert_eq!(err, RecipeError::unsupported_platform("os", "Plan9"));
    }

    #[test]
    fn test_os_round_trips_through_display() {
        for os in Os::ALL {
            assert_eq!(os.to_string().parse::<Os>().unwrap(), os);
        }
    }

    #[test]
    fn test_build_type_parsing() {
        assert_eq!("Debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert_eq!(
            "relwithdebinfo".parse::<BuildType>().unwrap(),
            BuildType::RelWithDebInfo
        );
        assert!("Profile".parse::<BuildType>().unwrap_err().is_unsupported_platform());
    }

    #[test]
    fn test_assign_settings() {
        let mut platform = PlatformDescriptor::new(Os::Linux);
        platform.assign("os=iOS").unwrap();
        platform.assign("arch=armv8").unwrap();
        platform.assign("build_type=Debug").unwrap();

        assert_eq!(platform.os, Os::Ios);
        assert_eq!(platform.arch, "armv8");
        assert_eq!(platform.build_type, BuildType::Debug);
    }

    #[test]
    fn test_assign_rejects_unknown_setting() {
        let mut platform = PlatformDescriptor::new(Os::Linux);

        assert!(platform.assign("libc=musl").unwrap_err().is_configuration());
        assert!(platform.assign("os=Haiku").unwrap_err().is_unsupported_platform());
    }
}
