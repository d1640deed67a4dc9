//! Circuit generation from a natural-language request.
//!
//! Keyword rules on the lower-cased description pick peripherals; each
//! peripheral adds its part, its signal nets and a wiring instruction.
//! Supply connections are collected as peripherals are added and become
//! the VCC and GND nets at the front of the net list.

use serde::{Deserialize, Serialize};

use crate::circuit::{
    parse_power_supply, CircuitSchema, Constraint, ConstraintKind, Net, NetConnection, Part,
    PowerSpec, DEFAULT_DESCRIPTION,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: Option<String>,
    /// Older name for `description`
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub power_supply: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub components: Option<Vec<String>>,
}

/// BOM line of a generated circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentEntry {
    pub name: String,
    pub quantity: u32,
    #[serde(rename = "ref")]
    pub ref_des: String,
    /// `N/A` when no part number is known
    pub mpn: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCircuit {
    pub component_list: Vec<ComponentEntry>,
    pub wiring_instructions: Vec<String>,
    pub circuit_schema: CircuitSchema,
}

const MCU_REF: &str = "U1";

/// A signal net from a microcontroller pin to a peripheral pin.
struct Signal {
    net: &'static str,
    mcu_pin: &'static str,
    part_pin: &'static str,
}

#[derive(Default)]
struct Builder {
    schema_parts: Vec<Part>,
    nets: Vec<Net>,
    pin_map: std::collections::BTreeMap<String, String>,
    vcc: Vec<NetConnection>,
    gnd: Vec<NetConnection>,
    wiring: Vec<String>,
    sensors: u32,
    servos: u32,
    resistors: u32,
    leds: u32,
}

impl Builder {
    fn new() -> Self {
        let mut builder = Self::default();
        builder.schema_parts.push(
            Part::new(MCU_REF, "Arduino Uno R3")
                .with_mpn("A000066")
                .with_logic_voltage(5.0),
        );
        builder.vcc.push(NetConnection::new(MCU_REF, "5V"));
        builder.gnd.push(NetConnection::new(MCU_REF, "GND"));
        builder.wiring.push("Connect Arduino 5V to breadboard positive rail.".to_string());
        builder.wiring.push("Connect Arduino GND to breadboard ground rail.".to_string());
        builder
    }

    fn next_ref(counter: &mut u32, prefix: char) -> String {
        *counter += 1;
        format!("{prefix}{counter}")
    }

    /// Powered peripheral with its own VCC/GND pins and signal nets.
    fn add_peripheral(&mut self, ref_des: &str, name: &str, signals: &[Signal]) {
        self.schema_parts.push(Part::new(ref_des, name));
        self.vcc.push(NetConnection::new(ref_des, "VCC"));
        self.gnd.push(NetConnection::new(ref_des, "GND"));
        for signal in signals {
            self.nets.push(
                Net::new(signal.net)
                    .with_connection(MCU_REF, signal.mcu_pin)
                    .with_connection(ref_des, signal.part_pin),
            );
            self.pin_map
                .insert(signal.net.to_string(), format!("{MCU_REF}:{}", signal.mcu_pin));
        }
    }

    fn add_dht11(&mut self) {
        let r = Self::next_ref(&mut self.sensors, 'S');
        self.add_peripheral(
            &r,
            "DHT11 Temperature & Humidity Sensor",
            &[Signal { net: "DHT_DATA", mcu_pin: "D2", part_pin: "DATA" }],
        );
        self.wiring
            .push(format!("Connect {r} DHT11: VCC→5V, GND→GND, DATA→D2."));
    }

    fn add_hc_sr04(&mut self) {
        let r = Self::next_ref(&mut self.sensors, 'S');
        self.add_peripheral(
            &r,
            "HC-SR04 Ultrasonic Sensor",
            &[
                Signal { net: "SR04_TRIG", mcu_pin: "D11", part_pin: "TRIG" },
                Signal { net: "SR04_ECHO", mcu_pin: "D12", part_pin: "ECHO" },
            ],
        );
        self.wiring.push(format!(
            "Connect {r} HC-SR04: VCC→5V, GND→GND, TRIG→D11, ECHO→D12."
        ));
    }

    fn add_servo(&mut self) {
        let r = Self::next_ref(&mut self.servos, 'M');
        self.add_peripheral(
            &r,
            "SG90 Micro Servo",
            &[Signal { net: "SERVO_SIG", mcu_pin: "D9", part_pin: "SIG" }],
        );
        self.wiring
            .push(format!("Connect {r} Servo: Brown→GND, Red→5V, Orange→D9."));
    }

    /// Status LED on D13 through a series resistor.
    fn add_status_led(&mut self) {
        let r_ref = Self::next_ref(&mut self.resistors, 'R');
        let d_ref = Self::next_ref(&mut self.leds, 'D');

        self.schema_parts.push(Part::new(&r_ref, "220 Ohm Resistor"));
        self.schema_parts.push(Part::new(&d_ref, "LED").with_max_current(20.0));
        self.nets.push(
            Net::new("LED_STATUS")
                .with_connection(MCU_REF, "D13")
                .with_connection(&r_ref, "1"),
        );
        self.nets.push(
            Net::new("LED_ANODE")
                .with_connection(&r_ref, "2")
                .with_connection(&d_ref, "A"),
        );
        self.gnd.push(NetConnection::new(&d_ref, "K"));
        self.pin_map
            .insert("LED_STATUS".to_string(), format!("{MCU_REF}:D13"));
        self.wiring.push(format!(
            "Connect {d_ref} LED: anode via {r_ref} 220Ω to D13, cathode to GND."
        ));
    }

    /// Requested parts go in unwired as `X<n>`, n being the part count so far.
    fn add_requested(&mut self, name: &str) {
        let r = format!("X{}", self.schema_parts.len());
        self.schema_parts.push(Part::new(r, name));
    }

    fn finish(mut self, description: String, power: PowerSpec, constraints: &[String]) -> GeneratedCircuit {
        let mut nets = vec![
            Net {
                name: "VCC".to_string(),
                connections: std::mem::take(&mut self.vcc),
            },
            Net {
                name: "GND".to_string(),
                connections: std::mem::take(&mut self.gnd),
            },
        ];
        nets.append(&mut self.nets);

        let mut schema = CircuitSchema::new(description, power);
        schema.parts = self.schema_parts;
        schema.nets = nets;
        schema.pin_map = self.pin_map;
        schema.constraints = constraints
            .iter()
            .enumerate()
            .map(|(i, c)| Constraint {
                id: format!("C{}", i + 1),
                description: c.clone(),
                kind: ConstraintKind::General,
            })
            .collect();

        let component_list = schema
            .parts
            .iter()
            .map(|p| ComponentEntry {
                name: p.name.clone(),
                quantity: p.quantity,
                ref_des: p.ref_des.clone(),
                mpn: p.mpn.clone().unwrap_or_else(|| "N/A".to_string()),
            })
            .collect();

        GeneratedCircuit {
            component_list,
            wiring_instructions: self.wiring,
            circuit_schema: schema,
        }
    }
}

/// Generate a circuit for a request.
pub fn generate_circuit(request: &GenerateRequest) -> GeneratedCircuit {
    let description = request
        .description
        .as_deref()
        .or(request.requirements.as_deref())
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| description.contains(w));

    let mut builder = Builder::new();

    if has(&["temperature", "humidity"]) {
        builder.add_dht11();
    }
    if has(&["distance", "ultrasonic"]) {
        builder.add_hc_sr04();
    }
    if has(&["servo", "motor"]) {
        builder.add_servo();
    }
    // a bare request still gets the status LED
    if has(&["led"]) || builder.schema_parts.len() == 1 {
        builder.add_status_led();
    }
    for name in request.components.iter().flatten() {
        builder.add_requested(name);
    }

    let power = PowerSpec::from_input_voltage(parse_power_supply(request.power_supply.as_deref()));
    let generated = builder.finish(description, power, &request.constraints);

    tracing::debug!(
        parts = generated.circuit_schema.parts.len(),
        nets = generated.circuit_schema.nets.len(),
        "circuit generated"
    );
    generated
}
