//! Unit tests for opengl_shader.rs
//!
//! GLSL preprocessing only; compiling needs a context.

use super::*;

// ============================================================================
// PREPROCESSOR DEFINITION TESTS
// ============================================================================

#[test]
fn test_no_definitions_keeps_source() {
    let source = "#version 430 core\nvoid main() {}\n";
    assert_eq!(inject_preprocessor_definitions(source, ""), source);
    assert_eq!(inject_preprocessor_definitions(source, "  \n"), source);
}

#[test]
fn test_definitions_follow_version_line() {
    let source = "#version 430 core\nlayout(location = 0) in vec3 Position;\nvoid main() {}\n";
    let result = inject_preprocessor_definitions(source, "#define SKINNED 1");

    assert_eq!(
        result,
        "#version 430 core\n#define SKINNED 1\n#line 2\nlayout(location = 0) in vec3 Position;\nvoid main() {}\n"
    );
}

#[test]
fn test_version_after_comment_lines() {
    let source = "// Forward pass\n\n  #version 450\nvoid main() {}";
    let result = inject_preprocessor_definitions(source, "#define A\n#define B\n");

    assert_eq!(result, "// Forward pass\n\n  #version 450\n#define A\n#define B\n#line 4\nvoid main() {}");
}

#[test]
fn test_version_on_last_line_without_newline() {
    let result = inject_preprocessor_definitions("#version 430", "#define A");
    assert_eq!(result, "#version 430\n#define A\n#line 2\n");
}

#[test]
fn test_definitions_prepended_without_version() {
    let source = "void main() {}\n";
    let result = inject_preprocessor_definitions(source, "#define LIGHTS 4");

    assert_eq!(result, "#define LIGHTS 4\n#line 1\nvoid main() {}\n");
}

#[test]
fn test_glsl_language_name() {
    assert_eq!(GLSL_NAME, "GLSL");
}
