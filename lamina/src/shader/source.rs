//! GLSL ES 1.00 sources of the two built-in pipelines.
//!
//! Positions are in framebuffer pixels, origin at the top-left corner; `u_ScreenSize` maps them
//! to clip space.

pub const TEXTURE_VS: &str = r#"
uniform vec2 u_ScreenSize;

attribute vec2 a_Position;
attribute vec2 a_TexCoord;
attribute float a_Alpha;

varying vec2 v_TexCoord;
varying float v_Alpha;

void main() {
  vec2 ndc = a_Position / u_ScreenSize * 2.0 - 1.0;
  gl_Position = vec4(ndc.x, -ndc.y, 0.0, 1.0);
  v_TexCoord = a_TexCoord;
  v_Alpha = a_Alpha;
}
"#;

pub const TEXTURE_FS: &str = r#"
precision mediump float;

uniform sampler2D u_Texture;

varying vec2 v_TexCoord;
varying float v_Alpha;

void main() {
  gl_FragColor = texture2D(u_Texture, v_TexCoord) * v_Alpha;
}
"#;

pub const COLOR_VS: &str = r#"
uniform vec2 u_ScreenSize;

attribute vec2 a_Position;
attribute vec4 a_Color;

varying vec4 v_Color;

void main() {
  vec2 ndc = a_Position / u_ScreenSize * 2.0 - 1.0;
  gl_Position = vec4(ndc.x, -ndc.y, 0.0, 1.0);
  v_Color = a_Color;
}
"#;

pub const COLOR_FS: &str = r#"
precision mediump float;

varying vec4 v_Color;

void main() {
  gl_FragColor = v_Color;
}
"#;
