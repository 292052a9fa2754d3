use std::cell::RefCell;
use std::collections::HashMap;

use cascade_contract::{RenderContext, UniformValue};
use cascade_core::{CascadeError, ShaderSource, ShaderStage};
use tracing::debug;

use crate::unit::ShaderUnit;

/// A linked, drawable shader program owning its two shader units.
///
/// Release comes in two granularities: [`release`](Self::release) frees the
/// program object only (the units stay valid and can be recovered with
/// [`into_units`](Self::into_units) for reattachment), while
/// [`release_all`](Self::release_all) frees the program and both units.
/// The valid flag is permanently false after either.
#[derive(Debug)]
pub struct ShaderProgram<C: RenderContext> {
    handle: C::Program,
    vertex: ShaderUnit<C>,
    fragment: ShaderUnit<C>,
    // Uniform locations are resolved once per name and then served from here.
    locations: RefCell<HashMap<String, Option<C::UniformLocation>>>,
    valid: bool,
}

impl<C: RenderContext> ShaderProgram<C> {
    /// Links a vertex and a fragment unit into a drawable program.
    ///
    /// Both units must be valid and carry the matching stage tag. The program
    /// takes ownership of the units; on any failure both are released (where
    /// still valid), so no dangling shader objects survive the error.
    pub fn link(
        ctx: &C,
        mut vertex: ShaderUnit<C>,
        mut fragment: ShaderUnit<C>,
    ) -> Result<Self, CascadeError> {
        if !vertex.is_valid() || !fragment.is_valid() {
            if vertex.is_valid() {
                vertex.release(ctx)?;
            }
            if fragment.is_valid() {
                fragment.release(ctx)?;
            }
            return Err(CascadeError::InvalidArgument(
                "cannot link released shader units".to_string(),
            ));
        }
        if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
            let err = CascadeError::InvalidArgument(format!(
                "expected a vertex and a fragment unit, got {} and {}",
                vertex.stage(),
                fragment.stage()
            ));
            vertex.release(ctx)?;
            fragment.release(ctx)?;
            return Err(err);
        }

        let handle = match ctx.link_program(vertex.handle(), fragment.handle()) {
            Ok(handle) => handle,
            Err(err) => {
                vertex.release(ctx)?;
                fragment.release(ctx)?;
                return Err(err);
            }
        };

        Ok(Self {
            handle,
            vertex,
            fragment,
            locations: RefCell::new(HashMap::new()),
            valid: true,
        })
    }

    /// Compiles both stages of `source` and links them in one step.
    pub fn from_source(ctx: &C, source: &ShaderSource) -> Result<Self, CascadeError> {
        if let Some(origin) = &source.origin {
            debug!(origin = origin.as_str(), "building shader program");
        }
        let mut vertex = ShaderUnit::compile(ctx, ShaderStage::Vertex, source.vertex.clone())?;
        let fragment =
            match ShaderUnit::compile(ctx, ShaderStage::Fragment, source.fragment.clone()) {
                Ok(fragment) => fragment,
                Err(err) => {
                    vertex.release(ctx)?;
                    return Err(err);
                }
            };
        Self::link(ctx, vertex, fragment)
    }

    /// Makes this program the active one. Fails after release.
    pub fn bind(&self, ctx: &C) -> Result<(), CascadeError> {
        if !self.valid {
            return Err(CascadeError::Released {
                object: "shader program",
                op: "bind",
            });
        }
        ctx.bind_program(self.handle);
        Ok(())
    }

    /// Unbinds whatever program is currently active.
    pub fn unbind(ctx: &C) {
        ctx.unbind_program();
    }

    /// Resolves (and caches) the location of a named uniform. The location is
    /// queried from the driver once; repeat registrations hit the cache.
    pub fn uniform_location(
        &self,
        ctx: &C,
        name: &str,
    ) -> Result<C::UniformLocation, CascadeError> {
        if !self.valid {
            return Err(CascadeError::Released {
                object: "shader program",
                op: "register a uniform on",
            });
        }
        let mut locations = self.locations.borrow_mut();
        let entry = locations
            .entry(name.to_string())
            .or_insert_with(|| ctx.uniform_location(self.handle, name));
        entry
            .clone()
            .ok_or_else(|| CascadeError::UniformNotFound(name.to_string()))
    }

    /// Assigns a named uniform. The program must currently be bound; that is
    /// a caller contract, same as the underlying driver's.
    pub fn set_uniform(&self, ctx: &C, name: &str, value: UniformValue) -> Result<(), CascadeError> {
        let location = self.uniform_location(ctx, name)?;
        ctx.set_uniform(&location, value);
        Ok(())
    }

    pub fn handle(&self) -> C::Program {
        self.handle
    }

    pub fn vertex(&self) -> &ShaderUnit<C> {
        &self.vertex
    }

    pub fn fragment(&self) -> &ShaderUnit<C> {
        &self.fragment
    }

    /// False once the program has been released (either granularity).
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Releases the program object only. The two shader units stay valid and
    /// can be recovered with [`into_units`](Self::into_units) and attached to
    /// another program.
    pub fn release(&mut self, ctx: &C) -> Result<(), CascadeError> {
        if !self.valid {
            return Err(CascadeError::Released {
                object: "shader program",
                op: "release",
            });
        }
        ctx.delete_program(self.handle);
        self.valid = false;
        Ok(())
    }

    /// Releases the program and both shader units. Nothing is reusable
    /// afterwards.
    pub fn release_all(&mut self, ctx: &C) -> Result<(), CascadeError> {
        self.release(ctx)?;
        self.vertex.release(ctx)?;
        self.fragment.release(ctx)?;
        Ok(())
    }

    /// Consumes the program and hands back its shader units for reuse,
    /// releasing the program object first if it is still live.
    pub fn into_units(mut self, ctx: &C) -> Result<(ShaderUnit<C>, ShaderUnit<C>), CascadeError> {
        if self.valid {
            self.release(ctx)?;
        }
        Ok((self.vertex, self.fragment))
    }
}
