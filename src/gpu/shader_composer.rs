use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::DeskroomError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming
/// shaders use `#import deskroom::module_name::{Item}` to pull in shared
/// declarations. The composer produces `naga::Module` IR directly, skipping
/// WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: source and file path.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/scene.wgsl"),
        file_path: "modules/scene.wgsl",
    },
];

/// A top-level scene shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Unlit baked meshes.
    Mesh,
    /// Procedural sky plate.
    Sky,
    /// Transmission glass.
    Glass,
    /// Additive sparkles.
    Sparkles,
    /// Full-screen gradient-map grade.
    GradientMap,
}

impl Shader {
    /// Every scene shader.
    pub const ALL: [Self; 5] = [
        Self::Mesh,
        Self::Sky,
        Self::Glass,
        Self::Sparkles,
        Self::GradientMap,
    ];

    fn source(self) -> &'static str {
        match self {
            Self::Mesh => include_str!("../../assets/shaders/mesh.wgsl"),
            Self::Sky => include_str!("../../assets/shaders/sky.wgsl"),
            Self::Glass => include_str!("../../assets/shaders/glass.wgsl"),
            Self::Sparkles => include_str!("../../assets/shaders/sparkles.wgsl"),
            Self::GradientMap => include_str!("../../assets/shaders/gradient_map.wgsl"),
        }
    }

    fn file_path(self) -> &'static str {
        match self {
            Self::Mesh => "mesh.wgsl",
            Self::Sky => "sky.wgsl",
            Self::Glass => "glass.wgsl",
            Self::Sparkles => "sparkles.wgsl",
            Self::GradientMap => "gradient_map.wgsl",
        }
    }
}

impl ShaderComposer {
    /// Register the shared modules.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, DeskroomError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    DeskroomError::Shader(format!(
                        "failed to register shader module '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose a scene shader into a `wgpu::ShaderModule` ready for
    /// pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, DeskroomError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.file_path()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a scene shader into a `naga::Module` without creating a wgpu
    /// shader module.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, DeskroomError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: shader.file_path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                DeskroomError::Shader(format!(
                    "failed to compose '{}': {e}",
                    shader.file_path()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{e}"));
            assert!(module.entry_points.iter().any(|e| e.name == "vs_main"));
            assert!(module.entry_points.iter().any(|e| e.name == "fs_main"));
        }
    }
}
