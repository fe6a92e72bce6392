//! Full-screen WGSL programs: the shared vertex stage plus one fragment source, checked with naga.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use naga::{AddressSpace, ImageClass, ImageDimension, ScalarKind, ShaderStage, TypeInner};
use thiserror::Error;

use crate::rendering::binder::{ParamKind, ScalarType, UniformBlock};
use crate::rendering::graph::{BufferId, InputSlot};

pub const FULLSCREEN_VERTEX: &str = include_str!("../../resources/shaders/fullscreen.wgsl");
pub const VERTEX_ENTRY: &str = "vs_main";
pub const SAMPLER_NAME: &str = "linear_sampler";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderSource
{
    Embedded { label: &'static str, code: &'static str },
    File(PathBuf)
}

impl ShaderSource
{
    pub fn embedded(label: &'static str, code: &'static str) -> Self
    {
        Self::Embedded { label, code }
    }

    pub fn label(&self) -> String
    {
        match self
        {
            Self::Embedded { label, .. } => label.to_string(),
            Self::File(path) => path.display().to_string()
        }
    }

    fn read(&self) -> Result<String, ShaderError>
    {
        match self
        {
            Self::Embedded { code, .. } => Ok(code.to_string()),
            Self::File(path) => std::fs::read_to_string(path).map_err(|source| ShaderError::Io
            {
                path: path.clone(),
                source
            })
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError
{
    #[error("could not read shader '{}': {source}", .path.display())]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("shader '{label}' failed to parse:\n{message}")]
    Parse { label: String, message: String },
    #[error("shader '{label}' failed validation: {message}")]
    Validation { label: String, message: String },
    #[error("shader '{label}' has no fragment entry point '{entry_point}'")]
    MissingEntryPoint { label: String, entry_point: String },
    #[error("shader '{label}' binds '{name}' in group {group}, only group 0 is supported")]
    UnsupportedGroup { label: String, name: String, group: u32 },
    #[error("shader '{label}' declares '{name}', which the host cannot bind")]
    UnsupportedResource { label: String, name: String }
}

/// Something a shader and its host disagree on. Reported, never fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingWarning
{
    MissingParam { name: &'static str },
    ParamKind { name: &'static str, host: ParamKind, shader: String },
    ParamOffset { name: &'static str, host: u32, shader: u32 },
    BlockSize { host: u64, shader: u64 },
    UnusedBlock { block: UniformBlock },
    UnfedUniform { name: String },
    MissingTexture { name: &'static str, source: BufferId },
    UnfedTexture { name: String }
}

impl fmt::Display for BindingWarning
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::MissingParam { name } => write!(f, "uniform '{}' is not declared by the shader", name),
            Self::ParamKind { name, host, shader } => write!(f, "uniform '{}' is {:?} on the host but {} in the shader", name, host, shader),
            Self::ParamOffset { name, host, shader } => write!(f, "uniform '{}' sits at byte {} on the host but {} in the shader", name, host, shader),
            Self::BlockSize { host, shader } => write!(f, "uniform block is {} bytes on the host but {} in the shader", host, shader),
            Self::UnusedBlock { block } => write!(f, "{:?} parameters are supplied but the shader declares no uniform block", block),
            Self::UnfedUniform { name } => write!(f, "shader uniform '{}' receives no host data and stays zeroed", name),
            Self::MissingTexture { name, source } => write!(f, "input '{}' (from '{}') is not sampled by the shader", name, source),
            Self::UnfedTexture { name } => write!(f, "shader texture '{}' is not fed by any input, binding the fallback", name)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBinding
{
    pub binding: u32,
    /// Bytes spanned by the shader's struct.
    pub span: u64
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureBinding
{
    pub binding: u32,
    pub name: String,
    /// `None` binds the fallback texture.
    pub source: Option<BufferId>
}

/// A host parameter resolved against the shader: the offset it is written at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamHandle
{
    pub name: &'static str,
    pub offset: u32
}

/// Everything needed to build a pass's bind group layout, resolved once at setup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassInterface
{
    pub uniform: Option<UniformBinding>,
    pub params: Vec<ParamHandle>,
    pub textures: Vec<TextureBinding>,
    pub samplers: Vec<u32>
}

impl PassInterface
{
    pub fn sampled_buffers(&self) -> impl Iterator<Item = BufferId> + '_
    {
        self.textures.iter().filter_map(|t| t.source)
    }
}

pub struct ShaderProgram
{
    label: String,
    code: String,
    module: naga::Module
}

impl ShaderProgram
{
    pub fn load(source: &ShaderSource) -> Result<Self, ShaderError>
    {
        let fragment = source.read()?;
        Self::compile(&source.label(), &fragment)
    }

    /// Prepends the full-screen vertex stage, then parses and validates the module.
    pub fn compile(label: &str, fragment: &str) -> Result<Self, ShaderError>
    {
        let code = format!("{}\n{}", FULLSCREEN_VERTEX, fragment);

        let module = naga::front::wgsl::parse_str(&code).map_err(|e| ShaderError::Parse
        {
            label: label.to_string(),
            message: e.emit_to_string(&code)
        })?;

        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty())
            .validate(&module)
            .map_err(|e| ShaderError::Validation
            {
                label: label.to_string(),
                message: format!("{:?}", e)
            })?;

        log::debug!("Compiled shader '{}'", label);

        Ok(Self
        {
            label: label.to_string(),
            code,
            module
        })
    }

    pub fn code(&self) -> &str { &self.code }

    pub fn require_fragment_entry(&self, entry_point: &str) -> Result<(), ShaderError>
    {
        let found = self.module.entry_points.iter()
            .any(|ep| ep.name == entry_point && ep.stage == ShaderStage::Fragment);

        if found
        {
            Ok(())
        }
        else
        {
            Err(ShaderError::MissingEntryPoint
            {
                label: self.label.clone(),
                entry_point: entry_point.to_string()
            })
        }
    }

    /// Matches the shader's globals against a host uniform block and the pass inputs.
    pub fn interface(&self, block: UniformBlock, inputs: &[InputSlot]) -> Result<(PassInterface, Vec<BindingWarning>), ShaderError>
    {
        let mut interface = PassInterface::default();
        let mut warnings = Vec::new();
        let mut shader_textures = HashMap::new();

        for (_, global) in self.module.global_variables.iter()
        {
            let Some(binding) = &global.binding else { continue };
            let name = global.name.clone().unwrap_or_default();

            if binding.group != 0
            {
                return Err(ShaderError::UnsupportedGroup { label: self.label.clone(), name, group: binding.group });
            }

            match (global.space, &self.module.types[global.ty].inner)
            {
                (AddressSpace::Uniform, inner) if interface.uniform.is_none() =>
                {
                    let members: &[naga::StructMember] = match inner
                    {
                        TypeInner::Struct { members, span } =>
                        {
                            interface.uniform = Some(UniformBinding { binding: binding.binding, span: *span as u64 });
                            members.as_slice()
                        },
                        _ =>
                        {
                            interface.uniform = Some(UniformBinding { binding: binding.binding, span: 0 });
                            &[]
                        }
                    };

                    if block == UniformBlock::None
                    {
                        warnings.push(BindingWarning::UnfedUniform { name });
                    }
                    else
                    {
                        self.resolve_params(block, members, &mut interface, &mut warnings);
                    }
                },
                // layouts are always built for filterable float 2D textures
                (AddressSpace::Handle, TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled { kind: ScalarKind::Float, multi: false }
                }) =>
                {
                    shader_textures.insert(name, binding.binding);
                },
                (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) =>
                {
                    interface.samplers.push(binding.binding);
                },
                _ => return Err(ShaderError::UnsupportedResource { label: self.label.clone(), name })
            }
        }

        if interface.uniform.is_none() && block != UniformBlock::None
        {
            warnings.push(BindingWarning::UnusedBlock { block });
        }

        for input in inputs
        {
            match shader_textures.remove(input.name)
            {
                Some(binding) => interface.textures.push(TextureBinding
                {
                    binding,
                    name: input.name.to_string(),
                    source: Some(input.source)
                }),
                None => warnings.push(BindingWarning::MissingTexture { name: input.name, source: input.source })
            }
        }

        let mut unfed = shader_textures.into_iter().collect::<Vec<_>>();
        unfed.sort_by_key(|(_, binding)| *binding);
        for (name, binding) in unfed
        {
            warnings.push(BindingWarning::UnfedTexture { name: name.clone() });
            interface.textures.push(TextureBinding { binding, name, source: None });
        }

        interface.textures.sort_by_key(|t| t.binding);
        interface.samplers.sort();

        Ok((interface, warnings))
    }

    fn resolve_params(&self, block: UniformBlock, members: &[naga::StructMember], interface: &mut PassInterface, warnings: &mut Vec<BindingWarning>)
    {
        for param in block.layout()
        {
            let Some(member) = members.iter().find(|m| m.name.as_deref() == Some(param.name)) else
            {
                warnings.push(BindingWarning::MissingParam { name: param.name });
                continue;
            };

            match self.param_kind(member.ty)
            {
                Some(kind) if kind == param.kind => {},
                _ =>
                {
                    warnings.push(BindingWarning::ParamKind
                    {
                        name: param.name,
                        host: param.kind,
                        shader: self.describe_type(member.ty)
                    });
                    continue;
                }
            }

            if member.offset != param.offset
            {
                warnings.push(BindingWarning::ParamOffset { name: param.name, host: param.offset, shader: member.offset });
                continue;
            }

            interface.params.push(ParamHandle { name: param.name, offset: member.offset });
        }

        if let Some(uniform) = interface.uniform
        {
            if uniform.span != block.size()
            {
                warnings.push(BindingWarning::BlockSize { host: block.size(), shader: uniform.span });
            }
        }
    }

    fn param_kind(&self, ty: naga::Handle<naga::Type>) -> Option<ParamKind>
    {
        let scalar = |kind: ScalarKind| match kind
        {
            ScalarKind::Float => Some(ScalarType::Float),
            ScalarKind::Uint => Some(ScalarType::Uint),
            ScalarKind::Sint => Some(ScalarType::Sint),
            _ => None
        };

        match &self.module.types[ty].inner
        {
            TypeInner::Scalar { kind, width: 4 } => scalar(*kind).map(ParamKind::Scalar),
            TypeInner::Vector { size, kind, width: 4 } => scalar(*kind).map(|s| ParamKind::Vector(*size as u8, s)),
            TypeInner::Array { .. } => Some(ParamKind::Array),
            _ => None
        }
    }

    fn describe_type(&self, ty: naga::Handle<naga::Type>) -> String
    {
        let ty = &self.module.types[ty];
        match &ty.name
        {
            Some(name) => name.clone(),
            None => format!("{:?}", ty.inner)
        }
    }
}
