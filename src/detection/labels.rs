//! Class labels in classifier output order, with healthy markers and display names.

use serde::{Serialize, Serializer};

use super::DetectionError;

/// Substring that marks a label as a healthy plant.
pub const HEALTHY_MARKER: &str = "Healthy";

/// Macro to generate the label enum with as_str + FromStr + the ordered ALL table
macro_rules! label_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every label, in classifier index order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DetectionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DetectionError::UnknownLabel(s.into())),
                }
            }
        }
    };
}

label_enum!(ClassLabel {
    AppleAppleScab => "Apple_Apple_scab",
    AppleBlackRot => "Apple_Black_rot",
    AppleCedarAppleRust => "Apple_Cedar_apple_rust",
    AppleHealthy => "Apple_Healthy",
    BackgroundWithoutLeaves => "Background_without_leaves",
    BlueberryHealthy => "Blueberry_Healthy",
    CherryPowderyMildew => "Cherry_Powdery_mildew",
    CherryHealthy => "Cherry_Healthy",
    CornCercosporaLeafSpot => "Corn_Cercospora_leaf_spot",
    CornCommonRust => "Corn_Common_rust",
    CornNorthernLeafBlight => "Corn_Northern_Leaf_Blight",
    CornHealthy => "Corn_Healthy",
    GrapeBlackRot => "Grape_Black_rot",
    GrapeEsca => "Grape_Esca",
    GrapeLeafBlight => "Grape_Leaf_blight",
    GrapeHealthy => "Grape_Healthy",
    OrangeHaunglongbing => "Orange_Haunglongbing",
    PeachBacterialSpot => "Peach_Bacterial_spot",
    PeachHealthy => "Peach_Healthy",
    PepperBacterialSpot => "Pepper_Bacterial_spot",
    PepperHealthy => "Pepper_Healthy",
    PotatoEarlyBlight => "Potato_Early_blight",
    PotatoLateBlight => "Potato_Late_blight",
    PotatoHealthy => "Potato_Healthy",
    RaspberryHealthy => "Raspberry_Healthy",
    SoybeanHealthy => "Soybean_Healthy",
    SquashPowderyMildew => "Squash_Powdery_mildew",
    StrawberryLeafScorch => "Strawberry_Leaf_scorch",
    StrawberryHealthy => "Strawberry_Healthy",
    TomatoBacterialSpot => "Tomato_Bacterial_spot",
    TomatoEarlyBlight => "Tomato_Early_blight",
    TomatoLateBlight => "Tomato_Late_blight",
    TomatoLeafMold => "Tomato_Leaf_Mold",
    TomatoSeptoriaLeafSpot => "Tomato_Septoria_leaf_spot",
    TomatoSpiderMites => "Tomato_Spider_mites",
    TomatoTargetSpot => "Tomato_Target_Spot",
    TomatoMosaicVirus => "Tomato_Mosaic_virus",
    TomatoYellowLeafCurlVirus => "Tomato_Yellow_Leaf_Curl_Virus",
    TomatoHealthy => "Tomato_Healthy",
});

/// Labels the "mostly green, no symptoms" rule picks from.
pub const HEALTHY_LABELS: &[ClassLabel] = &[
    ClassLabel::AppleHealthy,
    ClassLabel::BlueberryHealthy,
    ClassLabel::CherryHealthy,
    ClassLabel::CornHealthy,
    ClassLabel::GrapeHealthy,
    ClassLabel::PeachHealthy,
    ClassLabel::PepperHealthy,
    ClassLabel::PotatoHealthy,
    ClassLabel::RaspberryHealthy,
    ClassLabel::SoybeanHealthy,
    ClassLabel::StrawberryHealthy,
    ClassLabel::TomatoHealthy,
];

impl ClassLabel {
    pub fn is_healthy(&self) -> bool {
        self.as_str().contains(HEALTHY_MARKER)
    }

    /// Human-readable form: `Tomato_Late_blight` → `Tomato Late blight`.
    pub fn display_name(&self) -> String {
        display_name(self.as_str())
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClassLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Underscores to spaces, for any label-like string (including free text).
pub fn display_name(raw: &str) -> String {
    raw.replace('_', " ")
}
