// ------------------------------------------------------------
// Self-contained HTML player
// ------------------------------------------------------------
//
// Frames are PNG-encoded, embedded as base64 data URIs and driven by a small
// inline script (play / reverse / pause, stepping, speed, slider and loop
// mode). The resulting document has no external references.
// ------------------------------------------------------------

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};

use crate::error::{Result, VizError};

/// Total size of embedded frame data after which further frames are dropped.
pub const DEFAULT_EMBED_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// What the player does after the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    Once,
    #[default]
    Loop,
    Reflect,
}

impl LoopMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopMode::Once => "once",
            LoopMode::Loop => "loop",
            LoopMode::Reflect => "reflect",
        }
    }
}

/// Collects encoded frames and assembles the HTML document.
#[derive(Debug)]
pub struct JsHtmlEncoder {
    interval: Duration,
    default_mode: LoopMode,
    embed_limit: usize,
    embedded_bytes: usize,
    hit_limit: bool,
    element_id: Option<String>,
    frames: Vec<String>,
}

impl JsHtmlEncoder {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            default_mode: LoopMode::default(),
            embed_limit: DEFAULT_EMBED_LIMIT_BYTES,
            embedded_bytes: 0,
            hit_limit: false,
            element_id: None,
            frames: Vec::new(),
        }
    }

    pub fn with_embed_limit(mut self, bytes: usize) -> Self {
        self.embed_limit = bytes;
        self
    }

    pub fn with_default_mode(mut self, mode: LoopMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// DOM id (and global JS name) of the player. It must be a valid JS
    /// identifier. When unset, the id is derived from the embedded frames.
    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    // Same frames give the same id; players built from different data can
    // share a page.
    fn derived_id(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.frames.hash(&mut hasher);
        self.interval.hash(&mut hasher);
        format!("dp_anim_{:016x}", hasher.finish())
    }

    /// Encode and append one frame. Returns `false` once the embed limit has
    /// been reached; the frame that crosses the limit is still kept.
    pub fn push_frame(&mut self, frame: &RgbImage) -> Result<bool> {
        if self.hit_limit {
            return Ok(false);
        }

        let mut png = Vec::new();
        frame
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| VizError::Encode(e.to_string()))?;
        let encoded = STANDARD.encode(&png);

        self.embedded_bytes += encoded.len();
        self.frames.push(encoded);

        if self.embedded_bytes >= self.embed_limit {
            log::warn!(
                "animation size reached {} bytes (limit {}); remaining frames are dropped",
                self.embedded_bytes,
                self.embed_limit
            );
            self.hit_limit = true;
        }
        Ok(!self.hit_limit)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn hit_limit(&self) -> bool {
        self.hit_limit
    }

    pub fn finish(self) -> String {
        let id = self
            .element_id
            .clone()
            .unwrap_or_else(|| self.derived_id());
        let interval_ms = self.interval.as_secs_f64() * 1000.0;

        let mut frames_js = String::with_capacity(self.embedded_bytes + 64 * self.frames.len());
        for (k, frame) in self.frames.iter().enumerate() {
            if k > 0 {
                frames_js.push_str(",\n");
            }
            frames_js.push_str("    \"data:image/png;base64,");
            frames_js.push_str(frame);
            frames_js.push('"');
        }

        let mut modes = String::new();
        for mode in [LoopMode::Once, LoopMode::Loop, LoopMode::Reflect] {
            let checked = if mode == self.default_mode {
                " checked"
            } else {
                ""
            };
            modes.push_str(&format!(
                "    <label><input type=\"radio\" name=\"mode\" value=\"{0}\"{1}> {0}</label>\n",
                mode.as_str(),
                checked
            ));
        }

        PLAYER_TEMPLATE
            .replace("@ID@", &id)
            .replace("@LAST@", &self.frames.len().saturating_sub(1).to_string())
            .replace("@MODES@", &modes)
            .replace("@INTERVAL@", &format!("{}", interval_ms))
            .replace("@FRAMES@", &frames_js)
    }
}

const PLAYER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Double pendulum</title>
<style>
  .dp-anim { display: inline-block; font-family: sans-serif; text-align: center; }
  .dp-anim img { display: block; margin: 0 auto; }
  .dp-anim input[type=range] { width: 400px; }
  .dp-anim button { min-width: 2.2em; margin: 1px; }
</style>
</head>
<body>
<div class="dp-anim" id="@ID@">
  <img id="@ID@_img" alt="double pendulum frame">
  <div><input type="range" id="@ID@_slider" min="0" max="@LAST@" step="1" value="0"></div>
  <div>
    <button title="Slower" onclick="@ID@.slower()">&minus;</button>
    <button title="First frame" onclick="@ID@.first()">|&lt;</button>
    <button title="Previous frame" onclick="@ID@.previous()">&lt;</button>
    <button title="Play backwards" onclick="@ID@.playReverse()">&#9664;</button>
    <button title="Pause" onclick="@ID@.pause()">&#10074;&#10074;</button>
    <button title="Play" onclick="@ID@.play()">&#9654;</button>
    <button title="Next frame" onclick="@ID@.next()">&gt;</button>
    <button title="Last frame" onclick="@ID@.last()">&gt;|</button>
    <button title="Faster" onclick="@ID@.faster()">+</button>
  </div>
  <form id="@ID@_mode">
@MODES@  </form>
</div>
<script>
(function () {
  function Player(id, frames, interval) {
    this.frames = frames;
    this.interval = interval;
    this.index = 0;
    this.direction = 1;
    this.timer = null;
    this.img = document.getElementById(id + "_img");
    this.slider = document.getElementById(id + "_slider");
    this.form = document.getElementById(id + "_mode");
    var self = this;
    this.slider.oninput = function () {
      self.pause();
      self.show(parseInt(self.slider.value, 10));
    };
    this.show(0);
  }

  Player.prototype.mode = function () {
    var radios = this.form.elements["mode"];
    for (var k = 0; k < radios.length; k++) {
      if (radios[k].checked) { return radios[k].value; }
    }
    return "loop";
  };

  Player.prototype.show = function (i) {
    if (this.frames.length === 0) { return; }
    this.index = Math.max(0, Math.min(this.frames.length - 1, i));
    this.img.src = this.frames[this.index];
    this.slider.value = this.index;
  };

  Player.prototype.step = function () {
    var n = this.frames.length;
    var next = this.index + this.direction;
    if (next >= 0 && next < n) { this.show(next); return; }
    var mode = this.mode();
    if (mode === "loop") {
      this.show(this.direction > 0 ? 0 : n - 1);
    } else if (mode === "reflect") {
      this.direction = -this.direction;
      var back = this.index + this.direction;
      if (back >= 0 && back < n) { this.show(back); } else { this.pause(); }
    } else {
      this.pause();
    }
  };

  Player.prototype.start = function (direction) {
    this.pause();
    this.direction = direction;
    var self = this;
    this.timer = setInterval(function () { self.step(); }, this.interval);
  };

  Player.prototype.play = function () { this.start(1); };
  Player.prototype.playReverse = function () { this.start(-1); };
  Player.prototype.pause = function () {
    if (this.timer !== null) { clearInterval(this.timer); this.timer = null; }
  };
  Player.prototype.first = function () { this.pause(); this.show(0); };
  Player.prototype.last = function () { this.pause(); this.show(this.frames.length - 1); };
  Player.prototype.next = function () { this.pause(); this.show(this.index + 1); };
  Player.prototype.previous = function () { this.pause(); this.show(this.index - 1); };

  Player.prototype.retime = function (factor) {
    this.interval = Math.max(1, this.interval * factor);
    if (this.timer !== null) { this.start(this.direction); }
  };
  Player.prototype.faster = function () { this.retime(1 / 1.2); };
  Player.prototype.slower = function () { this.retime(1.2); };

  var frames = [
@FRAMES@
  ];
  window["@ID@"] = new Player("@ID@", frames, @INTERVAL@);
  window["@ID@"].play();
})();
</script>
</body>
</html>
"#;
