//! Built-in palette catalogues.

use crate::model::{BlockKind, PaletteItem, Slot};
use serde::{Deserialize, Serialize};

/// Which catalogue the sidebar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Complete formulas.
    #[default]
    Sample,
    /// Fill-in slot templates.
    Advanced,
}

impl PaletteMode {
    pub fn items(self) -> Vec<PaletteItem> {
        match self {
            PaletteMode::Sample => sample_palette(),
            PaletteMode::Advanced => advanced_palette(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PaletteMode::Sample => PaletteMode::Advanced,
            PaletteMode::Advanced => PaletteMode::Sample,
        }
    }
}

fn item(id: &str, kind: BlockKind, label: &str, latex: &str, description: &str) -> PaletteItem {
    PaletteItem {
        id: id.to_string(),
        kind,
        label: label.to_string(),
        latex: latex.to_string(),
        description: description.to_string(),
        defaults: Vec::new(),
    }
}

/// Finished formulas, placed as plain math blocks.
pub fn sample_palette() -> Vec<PaletteItem> {
    use BlockKind::Math;
    vec![
        item("quadratic", Math, "解の公式", r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}", "二次方程式の解"),
        item("pythagorean", Math, "ピタゴラスの定理", "a^2 + b^2 = c^2", "直角三角形の辺の関係"),
        item("integral", Math, "定積分", r"\int_{a}^{b} f(x) dx", "曲線の下の面積"),
        item("matrix", Math, "2x2 行列", r"\begin{pmatrix} a & b \\ c & d \end{pmatrix}", "線形代数の基本"),
        item("summation", Math, "総和 (シグマ)", r"\sum_{i=0}^{n} i^2 = \frac{(n^2+n)(2n+1)}{6}", "数列の和"),
        item("limit", Math, "極限", r"\lim_{x \to \infty} \frac{1}{x} = 0", "関数の極限"),
        item("maxwell", Math, "マクスウェル方程式", r"\nabla \cdot E = \frac{\rho}{\epsilon_0}", "ガウスの法則"),
    ]
}

/// Value boxes with `<<k>>` slots, filled after placement.
pub fn advanced_palette() -> Vec<PaletteItem> {
    use BlockKind::Input;
    vec![
        item("adv-basic", Input, "数値ボックス (空)", "<<0>>", "クリックして入力"),
        item("adv-frac", Input, "数値ボックス (分数)", r"\frac{<<0>>}{<<1>>}", "分数"),
        item("adv-power", Input, "数値ボックス (べき乗)", "<<0>>^{<<1>>}", "上付き文字"),
        item("adv-sub", Input, "数値ボックス (添字)", "<<0>>_{<<1>>}", "下付き文字"),
        item("adv-sqrt", Input, "数値ボックス (ルート)", r"\sqrt{<<0>>}", "平方根"),
        item("adv-sum", Input, "数値ボックス (総和)", r"\sum_{<<0>>}^{<<1>>} <<2>>", "シグマ"),
        PaletteItem {
            // variable of integration starts out as x
            defaults: vec![Slot::empty(), Slot::empty(), Slot::empty(), Slot::leaf("x")],
            ..item("adv-int", Input, "数値ボックス (積分)", r"\int_{<<0>>}^{<<1>>} <<2>> \, d<<3>>", "インテグラル")
        },
        item("adv-lim", Input, "数値ボックス (極限)", r"\lim_{<<0>> \to <<1>>} <<2>>", "リミット"),
        item("adv-log", Input, "数値ボックス (対数)", r"\log_{<<0>>}{<<1>>}", "ログ"),
        item("adv-sin", Input, "数値ボックス (三角関数)", r"\sin <<0>>", "サイン"),
        item("adv-vec", Input, "数値ボックス (ベクトル)", r"\vec{<<0>>}", "ベクトル表記"),
        item(
            "adv-matrix",
            Input,
            "数値ボックス (行列)",
            r"\begin{pmatrix} <<0>> & <<1>> \\ <<2>> & <<3>> \end{pmatrix}",
            "2x2行列",
        ),
    ]
}
