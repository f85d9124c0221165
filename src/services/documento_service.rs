// src/services/documento_service.rs
//
// Emisión de los tres documentos oficiales. El guard corre primero:
// estado suficiente y sin alerta vigente para (obra, tipo). Emitir no
// persiste nada; el PDF se renderiza en memoria y se regresa al cliente.

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AlertaRepository, CatalogoRepository, ConceptoRepository, ObraRepository},
    models::{
        alerta::{Alerta, TipoDocumento},
        concepto::ObraConceptoDetalle,
        obra::Obra,
    },
    services::lifecycle,
};

const NOMBRE_DIRECCION: &str = "Dirección de Control de la Edificación";

#[derive(Clone)]
pub struct DocumentoService {
    obra_repo: ObraRepository,
    concepto_repo: ConceptoRepository,
    alerta_repo: AlertaRepository,
    catalogo_repo: CatalogoRepository,
    pool: PgPool,
}

impl DocumentoService {
    pub fn new(
        obra_repo: ObraRepository,
        concepto_repo: ConceptoRepository,
        alerta_repo: AlertaRepository,
        catalogo_repo: CatalogoRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            obra_repo,
            concepto_repo,
            alerta_repo,
            catalogo_repo,
            pool,
        }
    }

    // Guard puro, probado aparte: una alerta para el tipo pedido bloquea.
    fn verificar_guard(
        obra: &Obra,
        alerta: Option<&Alerta>,
    ) -> Result<(), AppError> {
        if !lifecycle::documento_disponible(obra.estado_obra) {
            return Err(AppError::DocumentoNoDisponible);
        }
        if let Some(a) = alerta {
            return Err(AppError::DocumentoBloqueado(format!(
                "Este documento tiene una alerta vigente: {}",
                a.mensaje
            )));
        }
        Ok(())
    }

    pub async fn generar_pdf(
        &self,
        obra_id: i64,
        tipo: TipoDocumento,
    ) -> Result<Vec<u8>, AppError> {
        // 1. Busca los datos y corre el guard
        let obra = self
            .obra_repo
            .get_obra(obra_id)
            .await?
            .ok_or(AppError::ObraNoEncontrada)?;

        let alerta = self.alerta_repo.buscar(&self.pool, obra_id, tipo).await?;
        Self::verificar_guard(&obra, alerta.as_ref())?;

        let calles = self.obra_repo.get_calles(obra_id).await?;
        let lineas = self.concepto_repo.listar_lineas(obra_id).await?;
        let colonia = match obra.colonia_id {
            Some(id) => self.catalogo_repo.get_colonia(id).await?,
            None => None,
        };
        let director = match obra.director_id {
            Some(id) => self.catalogo_repo.get_director(id).await?,
            None => None,
        };

        // 2. Configura el PDF
        // Carga la fuente de la carpeta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| {
                AppError::FontNotFound("Fuente no encontrada en la carpeta ./fonts".to_string())
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("{} - Obra {}", tipo.titulo(), obra.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        // --- ENCABEZADO OFICIAL ---
        doc.push(
            elements::Paragraph::new(NOMBRE_DIRECCION)
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Paragraph::new(tipo.titulo())
            .styled(style::Style::new().bold().with_font_size(13)));

        let consecutivo = obra.consecutivo.clone().unwrap_or_else(|| "S/N".to_string());
        doc.push(elements::Paragraph::new(format!("Expediente: {}", consecutivo)));
        doc.push(elements::Paragraph::new(format!(
            "Fecha de emisión: {}",
            chrono::Local::now().format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(1.5));

        // --- DATOS DEL PROPIETARIO Y EL PREDIO ---
        doc.push(elements::Paragraph::new(format!("Propietario: {}", obra.propietario)));
        if let Some(rep) = &obra.representante_legal {
            doc.push(elements::Paragraph::new(format!("Representante legal: {}", rep)));
        }
        for calle in &calles {
            doc.push(elements::Paragraph::new(format!(
                "Ubicación: {} No. {}",
                calle.calle, calle.numero_oficial
            )));
        }
        if let Some(col) = &colonia {
            doc.push(elements::Paragraph::new(format!("Colonia: {}", col.nombre)));
        }
        doc.push(elements::Break::new(1));

        // --- CUERPO SEGÚN EL TIPO DE DOCUMENTO ---
        match tipo {
            TipoDocumento::AlineamientoNumeroOficial => {
                doc.push(elements::Paragraph::new(
                    "Se hace constar el alineamiento oficial del predio y se asignan los \
                     números oficiales arriba indicados.",
                ));
            }
            TipoDocumento::LicenciaConstruccion => {
                doc.push(elements::Paragraph::new(format!(
                    "Se autoriza la obra con destino propuesto: {}.",
                    obra.destino_propuesto
                )));
                if let Some(desc) = &obra.descripcion_proyecto {
                    doc.push(elements::Paragraph::new(format!("Proyecto: {}", desc)));
                }
                if let Some(dir) = &director {
                    doc.push(elements::Paragraph::new(format!(
                        "Director responsable de obra: {} (Reg. {})",
                        dir.nombre, dir.numero_registro
                    )));
                }
                doc.push(elements::Break::new(1));
                doc.push(tabla_conceptos(&lineas)?);
                doc.push(elements::Break::new(1));

                let mut total = elements::Paragraph::new(format!(
                    "TOTAL: $ {:.2}",
                    obra.total_conceptos
                ));
                total.set_alignment(Alignment::Right);
                doc.push(total.styled(style::Style::new().bold().with_font_size(12)));
            }
            TipoDocumento::CertificadoHabitabilidad => {
                doc.push(elements::Paragraph::new(format!(
                    "Se certifica que la construcción con destino \"{}\" reúne las \
                     condiciones de habitabilidad exigidas por el reglamento municipal.",
                    obra.destino_propuesto
                )));
            }
        }

        doc.push(elements::Break::new(2));

        // --- FIRMAS ---
        doc.push(elements::Paragraph::new("_________________________"));
        doc.push(elements::Paragraph::new("Director de Control de la Edificación"));
        doc.push(elements::Break::new(2));

        // --- CÓDIGO QR DE VERIFICACIÓN ---
        // Lleva el expediente y el tipo de documento; permite cotejar el
        // papel impreso contra el sistema.
        let contenido_qr = format!("{}|{}", consecutivo, tipo.titulo());
        let code = QrCode::new(contenido_qr.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);

        // 3. Renderiza al buffer (memoria)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        tracing::info!("🖨️  Obra {}: emitido \"{}\"", obra_id, tipo.titulo());
        Ok(buffer)
    }
}

fn tabla_conceptos(lineas: &[ObraConceptoDetalle]) -> Result<elements::TableLayout, AppError> {
    // Pesos de columnas: Concepto (4), Cantidad (1), Unitario (2), Total (2)
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Concepto").styled(style_bold))
        .element(elements::Paragraph::new("Cant.").styled(style_bold))
        .element(elements::Paragraph::new("Unitario").styled(style_bold))
        .element(elements::Paragraph::new("Total").styled(style_bold))
        .push()
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    for linea in lineas {
        table
            .row()
            .element(elements::Paragraph::new(linea.concepto_nombre.clone()))
            .element(elements::Paragraph::new(format!("{:.2}", linea.cantidad)))
            .element(elements::Paragraph::new(format!("$ {:.2}", linea.costo_unitario)))
            .element(elements::Paragraph::new(format!("$ {:.2}", linea.total)))
            .push()
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::obra::{
        EstadoObra, EstadoPago, SiNo, TipoPropietario,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn obra_en(estado: EstadoObra) -> Obra {
        Obra {
            id: 42,
            consecutivo: Some("L-42".to_string()),
            tramite_id: Some(1),
            propietario: "María Pérez".to_string(),
            tipo_propietario: TipoPropietario::Fisica,
            representante_legal: None,
            identificacion: None,
            domicilio_propietario: None,
            telefono: None,
            colonia_id: None,
            manzana: None,
            lote: None,
            etapa: None,
            condominio: None,
            destino_actual: "Baldío".to_string(),
            destino_propuesto: "Casa habitación".to_string(),
            descripcion_proyecto: None,
            agua_potable: SiNo::Si,
            drenaje: SiNo::Si,
            energia_electrica: SiNo::Si,
            servidumbre_frente: None,
            servidumbre_lateral: None,
            servidumbre_fondo: None,
            cos: None,
            cus: None,
            estado_obra: estado,
            estado_pago: EstadoPago::SinPagar,
            estado_verificacion: SiNo::Si,
            fecha_inspeccion: None,
            notas_inspeccion: None,
            director_id: None,
            recibo_de_pago: None,
            folio_pago: None,
            fecha_pago: None,
            total_conceptos: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn alerta(mensaje: &str) -> Alerta {
        Alerta {
            id: 1,
            obra_id: 42,
            tipo_documento: TipoDocumento::LicenciaConstruccion,
            mensaje: mensaje.to_string(),
            creada_por: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sin_estado_suficiente_no_se_ofrece() {
        let obra = obra_en(EstadoObra::Verificado);
        let res = DocumentoService::verificar_guard(&obra, None);
        assert!(matches!(res, Err(AppError::DocumentoNoDisponible)));
    }

    #[test]
    fn la_alerta_bloquea_y_muestra_su_mensaje() {
        let obra = obra_en(EstadoObra::EnviadoAFirmas);
        let a = alerta("Falta pago de derechos");
        let res = DocumentoService::verificar_guard(&obra, Some(&a));
        match res {
            Err(AppError::DocumentoBloqueado(msg)) => {
                assert!(msg.contains("Falta pago de derechos"))
            }
            otro => panic!("se esperaba DocumentoBloqueado, se obtuvo {:?}", otro),
        }
    }

    #[test]
    fn sin_alerta_y_con_estado_el_guard_pasa() {
        for estado in [
            EstadoObra::EnviadoAFirmas,
            EstadoObra::EnviadoAPago,
            EstadoObra::Concluido,
        ] {
            assert!(DocumentoService::verificar_guard(&obra_en(estado), None).is_ok());
        }
    }
}
