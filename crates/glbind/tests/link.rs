use std::path::Path;
use std::rc::Rc;

use glbind::{Error, GpuObject, Shader, ShaderProgram, ShaderSource, ShaderStage};
use glbind_core::mock::MockGl;
use glbind_core::ObjectKind;

const VERT: &str = "in vec3 position;\nuniform mat4 mvp;\nvoid main() {}\n";
const FRAG: &str = "uniform vec4 tint;\nvoid main() {}\n";

#[test]
fn stages_are_inferred_before_anything_compiles() {
    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::new(mock.clone());

    let err = program
        .link(&[
            ShaderSource::Source(ShaderStage::Vertex, VERT),
            ShaderSource::File(Path::new("tint.glsl")),
        ])
        .unwrap_err();

    match err {
        Error::UnknownShaderStage { identifier } => assert!(identifier.contains("tint.glsl")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.call_count("compile_shader"), 0);
    assert_eq!(mock.call_count("create_object"), 0);
}

#[test]
fn compile_failure_leaves_the_program_unlinked() {
    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::new(mock.clone());

    let err = program
        .link(&[
            ShaderSource::Source(ShaderStage::Vertex, VERT),
            ShaderSource::Source(ShaderStage::Fragment, "#error unfinished\n"),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ShaderCompile {
            stage: ShaderStage::Fragment,
            ..
        }
    ));
    assert!(!program.is_linked());
    assert_eq!(mock.call_count("link_program"), 0);
    assert_eq!(mock.live_objects(), 0);
}

#[test]
fn link_failure_reports_the_log() {
    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::new(mock.clone());

    match program.link(&[]).unwrap_err() {
        Error::ShaderLink { info_log } => assert!(info_log.contains("no shaders")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!program.is_linked());
}

#[test]
fn files_link_and_are_detached() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let vert = dir.path().join("quad.vert");
    let frag = dir.path().join("quad.glslf");
    let extra = dir.path().join("tint.glsl");
    std::fs::write(&vert, VERT)?;
    std::fs::write(&frag, FRAG)?;
    std::fs::write(&extra, "uniform float extra;\nvoid helper() {}\n")?;

    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::from_sources(
        mock.clone(),
        &[
            ShaderSource::File(vert.as_path()),
            ShaderSource::File(frag.as_path()),
            ShaderSource::FileAs(ShaderStage::Fragment, extra.as_path()),
        ],
    )?;

    assert!(program.is_linked());
    assert!(mock.attached_shaders(program.id()).is_empty());
    assert_eq!(mock.call_count("detach_shader"), 3);
    assert!(program.uniform_location("tint")? >= 0);
    assert!(program.uniform_location("extra")? >= 0);
    Ok(())
}

#[test]
fn borrowed_shaders_outlive_the_link() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let vertex = Shader::from_source(mock.clone(), ShaderStage::Vertex, VERT)?;
    let program = ShaderProgram::from_sources(
        mock.clone(),
        &[
            ShaderSource::Shader(&vertex),
            ShaderSource::Source(ShaderStage::Fragment, FRAG),
        ],
    )?;

    assert!(program.is_linked());
    assert!(mock.is_live(ObjectKind::Shader(ShaderStage::Vertex), vertex.id()));
    assert_eq!(mock.live_objects(), 2);
    Ok(())
}

#[test]
fn missing_source_files_are_read_errors() {
    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::new(mock);
    let err = program
        .link(&[ShaderSource::File(Path::new("/nonexistent/quad.vert"))])
        .unwrap_err();
    assert!(matches!(err, Error::FileRead { .. }));
}
