use super::PacketFormat;
use super::error::DecodeError;
use super::fields::FieldTable;
use super::layout;
use super::reader::ForzaReader;

/// One value per wheel, in FL, FR, RL, RR order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wheels {
    pub fl: f32,
    pub fr: f32,
    pub rl: f32,
    pub rr: f32,
}

impl From<[f32; 4]> for Wheels {
    fn from([fl, fr, rl, rr]: [f32; 4]) -> Self {
        Self { fl, fr, rl, rr }
    }
}

/// Base "sled" telemetry block shared by every format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SledTelemetry {
    pub is_race_on: i32,
    pub timestamp_ms: u32,
    pub engine_max_rpm: f32,
    pub engine_idle_rpm: f32,
    pub current_engine_rpm: f32,
    pub acceleration_x: f32,
    pub acceleration_y: f32,
    pub acceleration_z: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub velocity_z: f32,
    pub angular_velocity_x: f32,
    pub angular_velocity_y: f32,
    pub angular_velocity_z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub norm_suspension_travel: Wheels,
    pub tire_slip_ratio: Wheels,
    pub wheel_rotation_speed: Wheels,
    pub wheel_on_rumble_strip: Wheels,
    pub wheel_in_puddle: Wheels,
    pub surface_rumble: Wheels,
    pub tire_slip_angle: Wheels,
    pub tire_combined_slip: Wheels,
    pub suspension_travel_meters: Wheels,
    pub car_ordinal: i32,
    pub car_class: i32,
    pub car_performance_index: i32,
    pub drivetrain_type: i32,
    pub num_cylinders: i32,
}

/// Fields appended by the "car dash" format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashTelemetry {
    pub position_x: f32,
    pub position_y: f32,
    pub position_z: f32,
    pub speed: f32,
    pub power: f32,
    pub torque: f32,
    pub tire_temp: Wheels,
    pub boost: f32,
    pub fuel: f32,
    pub dist_traveled: f32,
    pub best_lap_time: f32,
    pub last_lap_time: f32,
    pub cur_lap_time: f32,
    pub cur_race_time: f32,
    pub lap_no: u16,
    pub race_pos: u8,
    pub accel: u8,
    pub brake: u8,
    pub clutch: u8,
    pub handbrake: u8,
    pub gear: u8,
    pub steer: i8,
    pub norm_driving_line: i8,
    pub norm_ai_brake_diff: i8,
}

/// Decode one datagram using the layout of `format`.
///
/// The payload length must match the format exactly; `fh4` payloads are
/// remapped to the dash layout before decoding.
///
/// # Examples
/// ```
/// use forzalog_core::{PacketFormat, decode};
///
/// let mut payload = vec![0u8; 232];
/// payload[0..4].copy_from_slice(&1i32.to_le_bytes());
/// let table = decode(&payload, PacketFormat::Sled)?;
/// assert!(table.race_active());
/// assert_eq!(table.values::<&str>(None)?.len(), 58);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(payload: &[u8], format: PacketFormat) -> Result<FieldTable, DecodeError> {
    match format {
        PacketFormat::Sled => {
            let mut reader = ForzaReader::exact(payload, format, layout::SLED_LEN)?;
            let sled = parse_sled(&mut reader)?;
            Ok(FieldTable::new(format, sled, None))
        }
        PacketFormat::Dash => {
            let (sled, dash) = parse_dash(payload, format)?;
            Ok(FieldTable::new(format, sled, Some(dash)))
        }
        PacketFormat::Fh4 => {
            let remapped = remap_fh4(payload)?;
            let (sled, dash) = parse_dash(&remapped, format)?;
            Ok(FieldTable::new(format, sled, Some(dash)))
        }
    }
}

/// Drop the bytes Forza Horizon 4 inserts between the sled block and the
/// dash extension, producing a dash-sized buffer.
pub fn remap_fh4(payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
    ForzaReader::exact(payload, PacketFormat::Fh4, layout::FH4_LEN)?;
    let mut remapped = Vec::with_capacity(layout::DASH_LEN);
    remapped.extend_from_slice(&payload[layout::FH4_SLED_RANGE]);
    remapped.extend_from_slice(&payload[layout::FH4_DASH_RANGE]);
    Ok(remapped)
}

fn parse_dash(
    payload: &[u8],
    format: PacketFormat,
) -> Result<(SledTelemetry, DashTelemetry), DecodeError> {
    let mut reader = ForzaReader::exact(payload, format, layout::DASH_LEN)?;
    let sled = parse_sled(&mut reader)?;
    debug_assert_eq!(reader.offset(), layout::DASH_EXTENSION_OFFSET);
    let dash = parse_dash_extension(&mut reader)?;
    Ok((sled, dash))
}

fn parse_sled(reader: &mut ForzaReader<'_>) -> Result<SledTelemetry, DecodeError> {
    Ok(SledTelemetry {
        is_race_on: reader.read_i32_le()?,
        timestamp_ms: reader.read_u32_le()?,
        engine_max_rpm: reader.read_f32_le()?,
        engine_idle_rpm: reader.read_f32_le()?,
        current_engine_rpm: reader.read_f32_le()?,
        acceleration_x: reader.read_f32_le()?,
        acceleration_y: reader.read_f32_le()?,
        acceleration_z: reader.read_f32_le()?,
        velocity_x: reader.read_f32_le()?,
        velocity_y: reader.read_f32_le()?,
        velocity_z: reader.read_f32_le()?,
        angular_velocity_x: reader.read_f32_le()?,
        angular_velocity_y: reader.read_f32_le()?,
        angular_velocity_z: reader.read_f32_le()?,
        yaw: reader.read_f32_le()?,
        pitch: reader.read_f32_le()?,
        roll: reader.read_f32_le()?,
        norm_suspension_travel: reader.read_wheels()?.into(),
        tire_slip_ratio: reader.read_wheels()?.into(),
        wheel_rotation_speed: reader.read_wheels()?.into(),
        wheel_on_rumble_strip: reader.read_wheels()?.into(),
        wheel_in_puddle: reader.read_wheels()?.into(),
        surface_rumble: reader.read_wheels()?.into(),
        tire_slip_angle: reader.read_wheels()?.into(),
        tire_combined_slip: reader.read_wheels()?.into(),
        suspension_travel_meters: reader.read_wheels()?.into(),
        car_ordinal: reader.read_i32_le()?,
        car_class: reader.read_i32_le()?,
        car_performance_index: reader.read_i32_le()?,
        drivetrain_type: reader.read_i32_le()?,
        num_cylinders: reader.read_i32_le()?,
    })
}

fn parse_dash_extension(reader: &mut ForzaReader<'_>) -> Result<DashTelemetry, DecodeError> {
    Ok(DashTelemetry {
        position_x: reader.read_f32_le()?,
        position_y: reader.read_f32_le()?,
        position_z: reader.read_f32_le()?,
        speed: reader.read_f32_le()?,
        power: reader.read_f32_le()?,
        torque: reader.read_f32_le()?,
        tire_temp: reader.read_wheels()?.into(),
        boost: reader.read_f32_le()?,
        fuel: reader.read_f32_le()?,
        dist_traveled: reader.read_f32_le()?,
        best_lap_time: reader.read_f32_le()?,
        last_lap_time: reader.read_f32_le()?,
        cur_lap_time: reader.read_f32_le()?,
        cur_race_time: reader.read_f32_le()?,
        lap_no: reader.read_u16_le()?,
        race_pos: reader.read_u8()?,
        accel: reader.read_u8()?,
        brake: reader.read_u8()?,
        clutch: reader.read_u8()?,
        handbrake: reader.read_u8()?,
        gear: reader.read_u8()?,
        steer: reader.read_i8()?,
        norm_driving_line: reader.read_i8()?,
        norm_ai_brake_diff: reader.read_i8()?,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode, remap_fh4};
    use crate::protocols::forza::error::DecodeError;
    use crate::protocols::forza::{FieldValue, PacketFormat, layout};

    fn dash_payload() -> Vec<u8> {
        let mut payload = vec![0u8; layout::DASH_LEN];
        payload[layout::IS_RACE_ON_RANGE].copy_from_slice(&1i32.to_le_bytes());
        payload[layout::TIMESTAMP_RANGE].copy_from_slice(&42u32.to_le_bytes());
        // speed is the fourth f32 of the extension
        let speed = layout::DASH_EXTENSION_OFFSET + 12;
        payload[speed..speed + 4].copy_from_slice(&33.5f32.to_le_bytes());
        // lap_no follows the 17 extension floats
        let lap_no = layout::DASH_EXTENSION_OFFSET + 68;
        payload[lap_no..lap_no + 2].copy_from_slice(&3u16.to_le_bytes());
        payload[lap_no + 2] = 5;
        payload[layout::DASH_LEN - 3] = (-12i8) as u8;
        payload
    }

    #[test]
    fn parse_valid_sled() {
        let mut payload = vec![0u8; layout::SLED_LEN];
        payload[layout::TIMESTAMP_RANGE].copy_from_slice(&1000u32.to_le_bytes());
        payload[8..12].copy_from_slice(&8500.0f32.to_le_bytes());
        payload[layout::SLED_LEN - 4..].copy_from_slice(&6i32.to_le_bytes());

        let table = decode(&payload, PacketFormat::Sled).unwrap();
        assert!(!table.race_active());
        assert_eq!(table.sled().timestamp_ms, 1000);
        assert_eq!(table.sled().engine_max_rpm, 8500.0);
        assert_eq!(table.sled().num_cylinders, 6);
        assert!(table.dash().is_none());
    }

    #[test]
    fn parse_valid_dash() {
        let table = decode(&dash_payload(), PacketFormat::Dash).unwrap();
        let dash = table.dash().unwrap();
        assert!(table.race_active());
        assert_eq!(dash.speed, 33.5);
        assert_eq!(dash.lap_no, 3);
        assert_eq!(dash.race_pos, 5);
        assert_eq!(dash.steer, -12);
        assert_eq!(table.get("steer").unwrap(), FieldValue::Int(-12));
    }

    #[test]
    fn wheel_groups_keep_fl_fr_rl_rr_order() {
        let mut payload = vec![0u8; layout::SLED_LEN];
        // tire_slip_ratio group starts after 17 scalars and one wheel group
        let start = (17 + 4) * 4;
        for (i, value) in [1.0f32, 2.0, 3.0, 4.0].iter().enumerate() {
            payload[start + i * 4..start + i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        let table = decode(&payload, PacketFormat::Sled).unwrap();
        let slip = table.sled().tire_slip_ratio;
        assert_eq!((slip.fl, slip.fr, slip.rl, slip.rr), (1.0, 2.0, 3.0, 4.0));
        assert_eq!(table.get("tire_slip_ratio_RL").unwrap(), FieldValue::Float(3.0));
    }

    #[test]
    fn fh4_matches_dash_of_remapped_bytes() {
        let dash = dash_payload();
        let mut fh4 = Vec::with_capacity(layout::FH4_LEN);
        fh4.extend_from_slice(&dash[..layout::SLED_LEN]);
        fh4.extend_from_slice(&[0xAA; 12]);
        fh4.extend_from_slice(&dash[layout::SLED_LEN..]);
        assert_eq!(fh4.len(), layout::FH4_LEN);

        let remapped = remap_fh4(&fh4).unwrap();
        assert_eq!(remapped.len(), layout::DASH_LEN);
        assert_eq!(remapped, dash);

        let from_fh4 = decode(&fh4, PacketFormat::Fh4).unwrap();
        let from_dash = decode(&dash, PacketFormat::Dash).unwrap();
        assert_eq!(from_fh4.format(), PacketFormat::Fh4);
        assert_eq!(from_fh4.sled(), from_dash.sled());
        assert_eq!(from_fh4.dash(), from_dash.dash());
    }

    #[test]
    fn parse_wrong_length() {
        let err = decode(&[0u8; layout::DASH_LEN], PacketFormat::Sled).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                format: PacketFormat::Sled,
                expected: layout::SLED_LEN,
                actual: layout::DASH_LEN,
            }
        );

        let err = decode(&[0u8; layout::DASH_LEN], PacketFormat::Fh4).unwrap_err();
        assert!(err.to_string().contains("fh4 packet length mismatch"));
    }
}
