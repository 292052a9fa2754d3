use cascade_contract::RenderContext;
use cascade_core::{CascadeError, ShaderStage};

/// A compiled shader object for one pipeline stage.
///
/// A unit is either fully compiled and valid, or construction fails with the
/// driver's diagnostic log; there is no partially-initialized visible state.
/// Releasing a unit permanently invalidates it.
#[derive(Debug)]
pub struct ShaderUnit<C: RenderContext> {
    stage: ShaderStage,
    source: String,
    handle: C::Shader,
    valid: bool,
}

impl<C: RenderContext> ShaderUnit<C> {
    /// Compiles `source` for `stage` against the active context.
    pub fn compile(
        ctx: &C,
        stage: ShaderStage,
        source: impl Into<String>,
    ) -> Result<Self, CascadeError> {
        if !ctx.supports_shader_programs() {
            return Err(CascadeError::UnsupportedShaders);
        }
        let source = source.into();
        let handle = ctx.compile_shader(stage, &source)?;
        Ok(Self {
            stage,
            source,
            handle,
            valid: true,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn handle(&self) -> C::Shader {
        self.handle
    }

    /// False once the unit has been released. A unit that compiled without an
    /// error is always valid until then.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Driver info log for this unit. Useful when a compile succeeded with
    /// warnings.
    pub fn log(&self, ctx: &C) -> String {
        ctx.shader_log(self.handle)
    }

    /// Frees the underlying shader object and permanently invalidates the
    /// unit. Do not release units still attached to a live program;
    /// [`crate::ShaderProgram::release_all`] handles that ordering.
    pub fn release(&mut self, ctx: &C) -> Result<(), CascadeError> {
        if !self.valid {
            return Err(CascadeError::Released {
                object: "shader unit",
                op: "release",
            });
        }
        ctx.delete_shader(self.handle);
        self.valid = false;
        Ok(())
    }
}
