//! WGSL validation of the particle shader.
//!
//! Parses and validates the shader with naga and checks that its interface
//! agrees with the host-side buffer layouts.

use pixelfield::shader::{instance_layout, quad_layout, PARTICLE_SHADER};
use pixelfield::uniforms::ParticleUniforms;

/// Validates WGSL code using naga.
fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module =
        naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn struct_type<'a>(module: &'a naga::Module, name: &str) -> &'a naga::TypeInner {
    module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(name))
        .map(|(_, ty)| &ty.inner)
        .unwrap_or_else(|| panic!("no struct named {}", name))
}

#[test]
fn test_particle_shader_validates() {
    if let Err(e) = validate_wgsl(PARTICLE_SHADER) {
        panic!("{}", e);
    }
}

#[test]
fn test_entry_points() {
    let module = validate_wgsl(PARTICLE_SHADER).unwrap();
    let entries: Vec<_> = module
        .entry_points
        .iter()
        .map(|e| (e.name.as_str(), e.stage))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("vs_main", naga::ShaderStage::Vertex),
            ("fs_main", naga::ShaderStage::Fragment),
        ]
    );
}

#[test]
fn test_bind_group_zero_has_four_bindings() {
    let module = validate_wgsl(PARTICLE_SHADER).unwrap();
    let mut bindings: Vec<_> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref())
        .map(|b| (b.group, b.binding))
        .collect();
    bindings.sort();
    assert_eq!(bindings, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
}

#[test]
fn test_uniform_block_matches_host_struct() {
    let module = validate_wgsl(PARTICLE_SHADER).unwrap();
    match struct_type(&module, "Uniforms") {
        naga::TypeInner::Struct { span, .. } => {
            assert_eq!(*span as usize, std::mem::size_of::<ParticleUniforms>());
        }
        other => panic!("Uniforms is {:?}", other),
    }
}

#[test]
fn test_vertex_inputs_match_buffer_layouts() {
    let module = validate_wgsl(PARTICLE_SHADER).unwrap();
    let mut shader_locations: Vec<u32> = match struct_type(&module, "VertexInput") {
        naga::TypeInner::Struct { members, .. } => members
            .iter()
            .filter_map(|m| match m.binding {
                Some(naga::Binding::Location { location, .. }) => Some(location),
                _ => None,
            })
            .collect(),
        other => panic!("VertexInput is {:?}", other),
    };
    shader_locations.sort();

    let mut host_locations: Vec<u32> = quad_layout()
        .attributes
        .iter()
        .chain(instance_layout().attributes.iter())
        .map(|a| a.shader_location)
        .collect();
    host_locations.sort();

    assert_eq!(shader_locations, host_locations);
}
