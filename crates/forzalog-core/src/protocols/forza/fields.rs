use std::fmt;
use std::sync::LazyLock;

use super::PacketFormat;
use super::error::UnknownFieldError;
use super::layout;
use super::parser::{DashTelemetry, SledTelemetry};

/// Synthetic column stamped by the recorder, never present on the wire.
pub const WALL_CLOCK_FIELD: &str = "wall_clock";

/// A single decoded scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Float(f32),
    Text(String),
}

impl fmt::Display for FieldValue {
    /// Floats use fixed notation with six decimals, integers plain decimal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.6}"),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i8> for FieldValue {
    fn from(value: i8) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::UInt(value.into())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::UInt(value.into())
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::UInt(value.into())
    }
}

struct FieldDef<T> {
    name: &'static str,
    get: fn(&T) -> FieldValue,
}

macro_rules! field_table {
    ($ty:ty; $($name:literal => $($path:ident).+),* $(,)?) => {
        [$(FieldDef::<$ty> {
            name: $name,
            get: |p: &$ty| FieldValue::from(p.$($path).+),
        }),*]
    };
}

static SLED_FIELDS: [FieldDef<SledTelemetry>; layout::SLED_FIELD_COUNT] = field_table![SledTelemetry;
    "is_race_on" => is_race_on,
    "timestamp_ms" => timestamp_ms,
    "engine_max_rpm" => engine_max_rpm,
    "engine_idle_rpm" => engine_idle_rpm,
    "current_engine_rpm" => current_engine_rpm,
    "acceleration_x" => acceleration_x,
    "acceleration_y" => acceleration_y,
    "acceleration_z" => acceleration_z,
    "velocity_x" => velocity_x,
    "velocity_y" => velocity_y,
    "velocity_z" => velocity_z,
    "angular_velocity_x" => angular_velocity_x,
    "angular_velocity_y" => angular_velocity_y,
    "angular_velocity_z" => angular_velocity_z,
    "yaw" => yaw,
    "pitch" => pitch,
    "roll" => roll,
    "norm_suspension_travel_FL" => norm_suspension_travel.fl,
    "norm_suspension_travel_FR" => norm_suspension_travel.fr,
    "norm_suspension_travel_RL" => norm_suspension_travel.rl,
    "norm_suspension_travel_RR" => norm_suspension_travel.rr,
    "tire_slip_ratio_FL" => tire_slip_ratio.fl,
    "tire_slip_ratio_FR" => tire_slip_ratio.fr,
    "tire_slip_ratio_RL" => tire_slip_ratio.rl,
    "tire_slip_ratio_RR" => tire_slip_ratio.rr,
    "wheel_rotation_speed_FL" => wheel_rotation_speed.fl,
    "wheel_rotation_speed_FR" => wheel_rotation_speed.fr,
    "wheel_rotation_speed_RL" => wheel_rotation_speed.rl,
    "wheel_rotation_speed_RR" => wheel_rotation_speed.rr,
    "wheel_on_rumble_strip_FL" => wheel_on_rumble_strip.fl,
    "wheel_on_rumble_strip_FR" => wheel_on_rumble_strip.fr,
    "wheel_on_rumble_strip_RL" => wheel_on_rumble_strip.rl,
    "wheel_on_rumble_strip_RR" => wheel_on_rumble_strip.rr,
    "wheel_in_puddle_FL" => wheel_in_puddle.fl,
    "wheel_in_puddle_FR" => wheel_in_puddle.fr,
    "wheel_in_puddle_RL" => wheel_in_puddle.rl,
    "wheel_in_puddle_RR" => wheel_in_puddle.rr,
    "surface_rumble_FL" => surface_rumble.fl,
    "surface_rumble_FR" => surface_rumble.fr,
    "surface_rumble_RL" => surface_rumble.rl,
    "surface_rumble_RR" => surface_rumble.rr,
    "tire_slip_angle_FL" => tire_slip_angle.fl,
    "tire_slip_angle_FR" => tire_slip_angle.fr,
    "tire_slip_angle_RL" => tire_slip_angle.rl,
    "tire_slip_angle_RR" => tire_slip_angle.rr,
    "tire_combined_slip_FL" => tire_combined_slip.fl,
    "tire_combined_slip_FR" => tire_combined_slip.fr,
    "tire_combined_slip_RL" => tire_combined_slip.rl,
    "tire_combined_slip_RR" => tire_combined_slip.rr,
    "suspension_travel_meters_FL" => suspension_travel_meters.fl,
    "suspension_travel_meters_FR" => suspension_travel_meters.fr,
    "suspension_travel_meters_RL" => suspension_travel_meters.rl,
    "suspension_travel_meters_RR" => suspension_travel_meters.rr,
    "car_ordinal" => car_ordinal,
    "car_class" => car_class,
    "car_performance_index" => car_performance_index,
    "drivetrain_type" => drivetrain_type,
    "num_cylinders" => num_cylinders,
];

static DASH_FIELDS: [FieldDef<DashTelemetry>; layout::DASH_EXTENSION_FIELD_COUNT] = field_table![DashTelemetry;
    "position_x" => position_x,
    "position_y" => position_y,
    "position_z" => position_z,
    "speed" => speed,
    "power" => power,
    "torque" => torque,
    "tire_temp_FL" => tire_temp.fl,
    "tire_temp_FR" => tire_temp.fr,
    "tire_temp_RL" => tire_temp.rl,
    "tire_temp_RR" => tire_temp.rr,
    "boost" => boost,
    "fuel" => fuel,
    "dist_traveled" => dist_traveled,
    "best_lap_time" => best_lap_time,
    "last_lap_time" => last_lap_time,
    "cur_lap_time" => cur_lap_time,
    "cur_race_time" => cur_race_time,
    "lap_no" => lap_no,
    "race_pos" => race_pos,
    "accel" => accel,
    "brake" => brake,
    "clutch" => clutch,
    "handbrake" => handbrake,
    "gear" => gear,
    "steer" => steer,
    "norm_driving_line" => norm_driving_line,
    "norm_ai_brake_diff" => norm_ai_brake_diff,
];

static SLED_NAMES: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| SLED_FIELDS.iter().map(|def| def.name).collect());

static DASH_NAMES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SLED_FIELDS
        .iter()
        .map(|def| def.name)
        .chain(DASH_FIELDS.iter().map(|def| def.name))
        .collect()
});

/// Column names of `format`, in wire order.
///
/// `fh4` shares the dash column set.
///
/// # Examples
/// ```
/// use forzalog_core::{PacketFormat, field_names};
///
/// assert_eq!(field_names(PacketFormat::Sled).len(), 58);
/// assert_eq!(field_names(PacketFormat::Fh4), field_names(PacketFormat::Dash));
/// assert_eq!(field_names(PacketFormat::Dash)[0], "is_race_on");
/// ```
pub fn field_names(format: PacketFormat) -> &'static [&'static str] {
    match format {
        PacketFormat::Sled => SLED_NAMES.as_slice(),
        PacketFormat::Dash | PacketFormat::Fh4 => DASH_NAMES.as_slice(),
    }
}

/// Check a column selection against the columns `format` can produce.
pub fn validate_selection<S: AsRef<str>>(
    format: PacketFormat,
    selection: &[S],
) -> Result<(), UnknownFieldError> {
    let names = field_names(format);
    for name in selection {
        let name = name.as_ref();
        if name != WALL_CLOCK_FIELD && !names.contains(&name) {
            return Err(UnknownFieldError {
                name: name.to_string(),
                format,
            });
        }
    }
    Ok(())
}

/// Decoded fields of one datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    format: PacketFormat,
    sled: SledTelemetry,
    dash: Option<DashTelemetry>,
    wall_clock: Option<String>,
}

impl FieldTable {
    pub(crate) fn new(format: PacketFormat, sled: SledTelemetry, dash: Option<DashTelemetry>) -> Self {
        Self {
            format,
            sled,
            dash,
            wall_clock: None,
        }
    }

    /// Format the datagram was decoded with.
    pub fn format(&self) -> PacketFormat {
        self.format
    }

    pub fn sled(&self) -> &SledTelemetry {
        &self.sled
    }

    pub fn dash(&self) -> Option<&DashTelemetry> {
        self.dash.as_ref()
    }

    pub fn race_active(&self) -> bool {
        self.sled.is_race_on != 0
    }

    pub fn wall_clock(&self) -> Option<&str> {
        self.wall_clock.as_deref()
    }

    pub fn stamp_wall_clock(&mut self, stamp: impl Into<String>) {
        self.wall_clock = Some(stamp.into());
    }

    /// Look up one field by column name.
    pub fn get(&self, name: &str) -> Result<FieldValue, UnknownFieldError> {
        if let Some(def) = SLED_FIELDS.iter().find(|def| def.name == name) {
            return Ok((def.get)(&self.sled));
        }
        if let Some(dash) = self.dash.as_ref() {
            if let Some(def) = DASH_FIELDS.iter().find(|def| def.name == name) {
                return Ok((def.get)(dash));
            }
        }
        if name == WALL_CLOCK_FIELD {
            if let Some(stamp) = self.wall_clock.as_ref() {
                return Ok(FieldValue::Text(stamp.clone()));
            }
        }
        Err(self.unknown(name))
    }

    /// Values of the selected columns in the given order, or every column of
    /// the table's format in wire order when `selection` is `None` or empty.
    pub fn values<S: AsRef<str>>(
        &self,
        selection: Option<&[S]>,
    ) -> Result<Vec<FieldValue>, UnknownFieldError> {
        match selection {
            Some(names) if !names.is_empty() => {
                names.iter().map(|name| self.get(name.as_ref())).collect()
            }
            _ => {
                let mut values: Vec<FieldValue> =
                    SLED_FIELDS.iter().map(|def| (def.get)(&self.sled)).collect();
                if let Some(dash) = self.dash.as_ref() {
                    values.extend(DASH_FIELDS.iter().map(|def| (def.get)(dash)));
                }
                Ok(values)
            }
        }
    }

    fn unknown(&self, name: &str) -> UnknownFieldError {
        UnknownFieldError {
            name: name.to_string(),
            format: self.format,
        }
    }
}
